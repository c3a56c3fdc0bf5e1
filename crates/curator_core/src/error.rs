use thiserror::Error;

use crate::{CollectionId, CompanyId, JobId};

/// User-visible failure categories. Each renders the message pushed into the
/// notification log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("Failed to load data: {0}")]
    Fetch(String),
    #[error("Failed to update favorite for company {company_id}: {message}")]
    Mutation { company_id: CompanyId, message: String },
    #[error("Transfer failed: {0}")]
    TransferStart(String),
    #[error("Failed to get status of transfer job {job_id}: {message}")]
    Poll { job_id: JobId, message: String },
    #[error("Transfer job {job_id} timed out")]
    Timeout { job_id: JobId },
    #[error("Failed to {action}: {message}")]
    Collection {
        action: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page {requested} is out of range (valid pages: 1..={total_pages})")]
    OutOfRange { requested: u64, total_pages: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("collection name is required")]
    EmptyName,
    #[error("a collection named '{0}' already exists")]
    DuplicateName(String),
    #[error("collection '{0}' cannot be deleted")]
    Protected(String),
    #[error("unknown collection {0}")]
    NotFound(CollectionId),
}

/// A command refused by `update` before any remote call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error("no collection selected")]
    NoCollection,
    #[error("no companies selected")]
    EmptySelection,
    #[error("source and target collections must differ")]
    SameCollection,
    #[error("company {0} is not on the loaded page")]
    UnknownCompany(CompanyId),
}
