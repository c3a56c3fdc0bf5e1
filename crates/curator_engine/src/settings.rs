use std::time::Duration;

use chrono::TimeDelta;
use curator_core::{
    default_max_poll_duration, CollectionId, CoreConfig, DEFAULT_PAGE_SIZE,
    FAVORITES_COLLECTION_ID,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Root of the collections API, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub page_size: u64,
    pub favorites_collection: CollectionId,
    pub poll_interval: Duration,
    pub max_poll_duration: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            favorites_collection: CollectionId::new(FAVORITES_COLLECTION_ID),
            poll_interval: Duration::from_millis(500),
            max_poll_duration: Duration::from_secs(30),
        }
    }
}

impl SessionSettings {
    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            page_size: self.page_size.max(1),
            favorites_collection: self.favorites_collection.clone(),
            max_poll_duration: TimeDelta::from_std(self.max_poll_duration)
                .unwrap_or_else(|_| default_max_poll_duration()),
        }
    }
}
