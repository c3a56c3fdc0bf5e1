use chrono::TimeDelta;

use crate::catalog::{Catalog, FAVORITES_COLLECTION_ID};
use crate::jobs::{default_max_poll_duration, JobBoard};
use crate::notifications::NotificationLog;
use crate::optimistic::MutationLedger;
use crate::pagination::{PageController, DEFAULT_PAGE_SIZE};
use crate::view_model::AppViewModel;
use crate::CollectionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub page_size: u64,
    pub favorites_collection: CollectionId,
    pub max_poll_duration: TimeDelta,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            favorites_collection: CollectionId::new(FAVORITES_COLLECTION_ID),
            max_poll_duration: default_max_poll_duration(),
        }
    }
}

/// Everything the view and the session share. Mutated only through
/// [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) catalog: Catalog,
    pub(crate) pages: PageController,
    pub(crate) favorites: MutationLedger<bool>,
    pub(crate) jobs: JobBoard,
    pub(crate) notifications: NotificationLog,
    pub(crate) favorites_collection: CollectionId,
    pub(crate) polling: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(CoreConfig::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            catalog: Catalog::default(),
            pages: PageController::new(config.page_size),
            favorites: MutationLedger::new(),
            jobs: JobBoard::new(config.max_poll_duration),
            notifications: NotificationLog::new(),
            favorites_collection: config.favorites_collection,
            polling: false,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pages(&self) -> &PageController {
        &self.pages
    }

    pub fn jobs(&self) -> &JobBoard {
        &self.jobs
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    pub fn favorites_in_flight(&self) -> usize {
        self.favorites.in_flight()
    }

    pub fn is_favorites_collection(&self, id: &CollectionId) -> bool {
        id == &self.favorites_collection
    }

    /// True while the polling task is supposed to be alive.
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
