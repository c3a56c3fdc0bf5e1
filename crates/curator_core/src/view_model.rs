use crate::catalog::is_protected_name;
use crate::jobs::{HistoryEntry, TrackedJob};
use crate::notifications::Notification;
use crate::selection::TriState;
use crate::{AppState, CollectionId, CompanyId, JobId, JobStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub collections: Vec<CollectionRowView>,
    pub collection_id: Option<CollectionId>,
    pub collection_name: Option<String>,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total: u64,
    pub start_index: u64,
    pub end_index: u64,
    pub search_term: String,
    pub loading: bool,
    /// Companies on the loaded page before filtering.
    pub loaded_count: usize,
    pub rows: Vec<CompanyRowView>,
    pub selected_count: usize,
    pub selection: TriState,
    pub jobs: Vec<JobRowView>,
    pub history: Vec<HistoryEntry>,
    pub notifications: Vec<Notification>,
    pub polling: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRowView {
    pub id: CollectionId,
    pub name: String,
    pub total: u64,
    pub selected: bool,
    pub favorites: bool,
    pub protected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRowView {
    pub id: CompanyId,
    pub name: String,
    pub liked: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub source_name: String,
    pub target_name: String,
    pub processed: u64,
    pub total: u64,
    pub inserted: u64,
    pub skipped: u64,
    pub failed: u64,
    pub error: Option<String>,
    pub percent: f64,
}

impl AppViewModel {
    pub(crate) fn build(state: &AppState) -> Self {
        let pages = &state.pages;
        let selection = pages.selection();
        let visible = pages.visible_records();
        let current_id = pages.collection_id();

        let collections = state
            .catalog
            .iter()
            .map(|c| CollectionRowView {
                id: c.id.clone(),
                name: c.name.clone(),
                total: c.total,
                selected: current_id == Some(&c.id),
                favorites: state.is_favorites_collection(&c.id),
                protected: is_protected_name(&c.name),
            })
            .collect();

        let collection_name = current_id.and_then(|id| {
            state
                .catalog
                .name_of(id)
                .map(str::to_owned)
                .or_else(|| pages.current().map(|p| p.collection_name.clone()))
        });

        let rows = visible
            .iter()
            .map(|c| CompanyRowView {
                id: c.id,
                name: c.name.clone(),
                liked: c.liked,
                selected: selection.contains(c.id),
            })
            .collect();

        // Running jobs first, then settled ones awaiting dismissal.
        let jobs = state
            .jobs
            .active()
            .chain(state.jobs.settled())
            .map(job_row)
            .collect();

        Self {
            collections,
            collection_id: current_id.cloned(),
            collection_name,
            page: pages.page(),
            page_size: pages.page_size(),
            total_pages: pages.total_pages(),
            total: pages.total(),
            start_index: pages.start_index(),
            end_index: pages.end_index(),
            search_term: pages.search_term().to_string(),
            loading: pages.loading(),
            loaded_count: pages.current().map_or(0, |p| p.companies.len()),
            rows,
            selected_count: selection.len(),
            selection: selection.tri_state(visible.len()),
            jobs,
            history: state.jobs.history().cloned().collect(),
            notifications: state.notifications.iter().cloned().collect(),
            polling: state.polling,
            dirty: state.is_dirty(),
        }
    }
}

fn job_row(tracked: &TrackedJob) -> JobRowView {
    let job = &tracked.job;
    JobRowView {
        job_id: job.job_id.clone(),
        status: job.status,
        source_name: tracked.source_name.clone(),
        target_name: tracked.target_name.clone(),
        processed: job.processed_count,
        total: job.total_count,
        inserted: job.inserted_count,
        skipped: job.skipped_count,
        failed: job.failed_count,
        error: job.error.clone(),
        percent: job.progress_percent(),
    }
}
