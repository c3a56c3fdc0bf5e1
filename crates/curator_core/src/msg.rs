use crate::{
    Collection, CollectionId, CompanyId, JobId, Page, TransferJob, TransferRequest,
    TransferSelection,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Reload collection metadata.
    CollectionsRequested,
    CollectionsLoaded(Vec<Collection>),
    CollectionsLoadFailed(String),
    /// User picked a collection in the sidebar.
    CollectionSelected(CollectionId),
    PageRequested(u64),
    NextPage,
    PreviousPage,
    SearchChanged(String),
    PageLoaded { generation: u64, page: Page },
    PageLoadFailed { generation: u64, message: String },
    SelectAll,
    SelectNone,
    SelectionToggled(CompanyId),
    /// User clicked the heart on a row.
    FavoriteToggled { company_id: CompanyId, liked: bool },
    FavoriteConfirmed { ticket: u64 },
    FavoriteRejected { ticket: u64, message: String },
    /// Start a transfer with an explicit selection snapshot.
    TransferRequested {
        target: CollectionId,
        selection: TransferSelection,
    },
    /// Start a transfer of whatever is currently selected.
    TransferSelectedRequested { target: CollectionId },
    TransferStarted { job_id: JobId, request: TransferRequest },
    TransferStartFailed { message: String },
    /// Polling timer fired.
    PollTick,
    JobPolled(TransferJob),
    JobPollFailed { job_id: JobId, message: String },
    JobDismissed(JobId),
    CreateCollectionRequested(String),
    CollectionCreated { id: CollectionId, name: String, message: String },
    CollectionCreateFailed(String),
    DeleteCollectionRequested(CollectionId),
    CollectionDeleted { id: CollectionId, message: String },
    CollectionDeleteFailed(String),
    RemoveCompaniesRequested(Vec<CompanyId>),
    RemoveSelectedRequested,
    CompaniesRemoved {
        collection_id: CollectionId,
        removed_count: u64,
        message: String,
    },
    CompaniesRemoveFailed(String),
    NotificationDismissed(u64),
    /// Fallback for placeholder wiring.
    NoOp,
}
