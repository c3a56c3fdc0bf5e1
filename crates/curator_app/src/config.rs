//! `curator.ron` configuration.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use curator_core::{CollectionId, DEFAULT_PAGE_SIZE, FAVORITES_COLLECTION_ID};
use curator_engine::{GatewaySettings, SessionSettings, DEFAULT_BASE_URL};
use curator_logging::{curator_debug, curator_info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

pub const CONFIG_FILENAME: &str = "curator.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub favorites_collection: String,
    pub page_size: u64,
    pub poll_interval_ms: u64,
    pub max_poll_duration_secs: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            favorites_collection: FAVORITES_COLLECTION_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval_ms: 500,
            max_poll_duration_secs: 30,
            connect_timeout_secs: 10,
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                curator_debug!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        let config = ron::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        curator_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Applies the `--server` flag (or `CURATOR_API_BASE_URL`).
    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.base_url = server;
        }
        self
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            page_size: self.page_size.max(1),
            favorites_collection: CollectionId::new(self.favorites_collection.clone()),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            max_poll_duration: Duration::from_secs(self.max_poll_duration_secs),
        }
    }

    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new())
            .context("failed to serialize config")
    }

    /// Writes the config next to `path` via a temp file and rename.
    pub fn save(&self, path: &Path) -> Result<PathBuf> {
        let content = self.to_ron()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to write {}", path.display()))?;
        curator_info!("Wrote config to {:?}", path);
        Ok(path.to_path_buf())
    }
}
