use crate::{CollectionId, CompanyId, JobId, PageRequest, Rejection, TransferRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadCollections,
    FetchPage(PageRequest),
    ToggleFavorite {
        ticket: u64,
        favorites_list_id: CollectionId,
        company_id: CompanyId,
        liked: bool,
    },
    StartTransfer(TransferRequest),
    /// The active set went from empty to non-empty.
    StartPolling,
    PollJobs(Vec<JobId>),
    /// No job is left to poll; the polling task should exit.
    StopPolling,
    /// Collection counts changed; whoever owns metadata should reload.
    RefreshCollections,
    CreateCollection(String),
    DeleteCollection(CollectionId),
    RemoveCompanies {
        collection_id: CollectionId,
        company_ids: Vec<CompanyId>,
    },
    /// The command was refused locally; nothing else happened.
    Reject(Rejection),
}
