use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::ring::BoundedLog;
use crate::{CollectionId, JobId, JobStatus, TransferJob};

pub const TIMEOUT_MESSAGE: &str = "Transfer job timed out";

/// Maximum time a job may stay non-terminal before it is failed locally.
pub fn default_max_poll_duration() -> TimeDelta {
    TimeDelta::seconds(30)
}

/// A job plus the client-side context needed to report on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedJob {
    pub job: TransferJob,
    pub source: CollectionId,
    pub source_name: String,
    pub target: CollectionId,
    pub target_name: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: JobId,
    pub source_list: String,
    pub target_list: String,
    pub count: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobTransition {
    /// Result for a job that is unknown or already settled.
    Stale,
    /// Snapshot would move the status backwards.
    Regressed,
    Progressed,
    Completed(HistoryEntry),
    Failed { error: Option<String> },
    TimedOut,
}

/// Active (non-terminal) jobs, settled jobs awaiting dismissal, and the
/// completed-transfer history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobBoard {
    active: BTreeMap<JobId, TrackedJob>,
    settled: BTreeMap<JobId, TrackedJob>,
    history: BoundedLog<HistoryEntry>,
    max_poll_duration: TimeDelta,
}

impl Default for JobBoard {
    fn default() -> Self {
        Self::new(default_max_poll_duration())
    }
}

impl JobBoard {
    pub fn new(max_poll_duration: TimeDelta) -> Self {
        Self {
            active: BTreeMap::new(),
            settled: BTreeMap::new(),
            history: BoundedLog::default(),
            max_poll_duration,
        }
    }

    pub fn insert(&mut self, tracked: TrackedJob) {
        self.settled.remove(&tracked.job.job_id);
        self.active.insert(tracked.job.job_id.clone(), tracked);
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Ids to query on the next polling tick.
    pub fn active_ids(&self) -> Vec<JobId> {
        self.active.keys().cloned().collect()
    }

    pub fn get(&self, job_id: &JobId) -> Option<&TrackedJob> {
        self.active.get(job_id).or_else(|| self.settled.get(job_id))
    }

    /// Fold a fresh server snapshot into the board. The entry is replaced
    /// whole; terminal jobs leave the active set.
    pub fn apply_status(&mut self, snapshot: TransferJob, now: DateTime<Utc>) -> JobTransition {
        let Some(current) = self.active.get(&snapshot.job_id) else {
            return JobTransition::Stale;
        };
        if snapshot.status.rank() < current.job.status.rank() {
            return JobTransition::Regressed;
        }

        let tracked = TrackedJob {
            job: snapshot,
            ..current.clone()
        };
        let job_id = tracked.job.job_id.clone();

        match tracked.job.status {
            JobStatus::Completed => {
                let entry = HistoryEntry {
                    id: job_id.clone(),
                    source_list: tracked.source_name.clone(),
                    target_list: tracked.target_name.clone(),
                    count: tracked.job.inserted_count,
                    timestamp: now,
                };
                self.active.remove(&job_id);
                self.settled.insert(job_id, tracked);
                self.history.push(entry.clone());
                JobTransition::Completed(entry)
            }
            JobStatus::Failed => {
                let error = tracked.job.error.clone();
                self.active.remove(&job_id);
                self.settled.insert(job_id, tracked);
                JobTransition::Failed { error }
            }
            JobStatus::Queued | JobStatus::Running => {
                if self.is_overdue(&tracked, now) {
                    self.time_out(tracked);
                    return JobTransition::TimedOut;
                }
                self.active.insert(job_id, tracked);
                JobTransition::Progressed
            }
        }
    }

    /// Fail every active job past the poll deadline. The server is not told.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<JobId> {
        let overdue: Vec<JobId> = self
            .active
            .values()
            .filter(|tracked| self.is_overdue(tracked, now))
            .map(|tracked| tracked.job.job_id.clone())
            .collect();
        for job_id in &overdue {
            if let Some(tracked) = self.active.remove(job_id) {
                self.time_out(tracked);
            }
        }
        overdue
    }

    /// Remove a settled job from view. Active jobs cannot be dismissed.
    pub fn dismiss(&mut self, job_id: &JobId) -> bool {
        self.settled.remove(job_id).is_some()
    }

    pub fn active(&self) -> impl Iterator<Item = &TrackedJob> {
        self.active.values()
    }

    pub fn settled(&self) -> impl Iterator<Item = &TrackedJob> {
        self.settled.values()
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    fn is_overdue(&self, tracked: &TrackedJob, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(tracked.started_at) > self.max_poll_duration
    }

    fn time_out(&mut self, tracked: TrackedJob) {
        let job = TransferJob {
            status: JobStatus::Failed,
            error: Some(TIMEOUT_MESSAGE.to_string()),
            ..tracked.job
        };
        let tracked = TrackedJob { job, ..tracked };
        self.active.remove(&tracked.job.job_id);
        self.settled.insert(tracked.job.job_id.clone(), tracked);
    }
}
