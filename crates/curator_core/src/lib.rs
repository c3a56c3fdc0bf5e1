//! Curator core: pure state machine for collections, selection, favorites,
//! and transfer jobs.
mod catalog;
mod effect;
mod error;
mod jobs;
mod msg;
mod notifications;
mod optimistic;
mod pagination;
mod ring;
mod selection;
mod state;
mod types;
mod update;
mod view_model;

pub use catalog::{is_protected_name, Catalog, FAVORITES_COLLECTION_ID, PROTECTED_COLLECTION_NAME};
pub use effect::Effect;
pub use error::{CollectionError, Failure, PageError, Rejection};
pub use jobs::{
    default_max_poll_duration, HistoryEntry, JobBoard, JobTransition, TrackedJob, TIMEOUT_MESSAGE,
};
pub use msg::Msg;
pub use notifications::{Notification, NotificationKind, NotificationLog};
pub use optimistic::{Liked, MutationLedger, OptimisticField, PendingMutation};
pub use pagination::{PageController, PageRequest, DEFAULT_PAGE_SIZE};
pub use ring::{BoundedLog, LOG_CAPACITY};
pub use selection::{SelectionSet, TriState};
pub use state::{AppState, CoreConfig};
pub use types::{
    Collection, CollectionId, Company, CompanyId, JobId, JobStatus, Page, TransferJob,
    TransferRequest, TransferSelection,
};
pub use update::update;
pub use view_model::{AppViewModel, CollectionRowView, CompanyRowView, JobRowView};
