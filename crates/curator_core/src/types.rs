use std::fmt;

pub type CompanyId = i64;

/// Server-assigned collection identifier (a UUID string on the wire).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Server-assigned transfer job identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    /// Server-reported member count, independent of any loaded page.
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub liked: bool,
}

/// One `(collection, offset, limit)` slice as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub collection_id: CollectionId,
    pub collection_name: String,
    pub offset: u64,
    pub companies: Vec<Company>,
    pub total: u64,
}

impl Page {
    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn company_mut(&mut self, id: CompanyId) -> Option<&mut Company> {
        self.companies.iter_mut().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position in the `queued -> running -> terminal` order.
    pub(crate) fn rank(self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Running => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub job_id: JobId,
    pub status: JobStatus,
    pub total_count: u64,
    pub processed_count: u64,
    pub inserted_count: u64,
    pub skipped_count: u64,
    pub failed_count: u64,
    pub error: Option<String>,
}

impl TransferJob {
    /// Client-side placeholder inserted before the first poll returns.
    pub fn queued(job_id: JobId, total_count: u64) -> Self {
        Self {
            job_id,
            status: JobStatus::Queued,
            total_count,
            processed_count: 0,
            inserted_count: 0,
            skipped_count: 0,
            failed_count: 0,
            error: None,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        (self.processed_count as f64 / self.total_count as f64) * 100.0
    }
}

/// Which records of the source collection a transfer covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferSelection {
    All,
    Ids(Vec<CompanyId>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: CollectionId,
    pub target: CollectionId,
    pub selection: TransferSelection,
}
