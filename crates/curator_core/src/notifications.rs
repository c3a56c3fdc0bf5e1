use chrono::{DateTime, Utc};

use crate::ring::BoundedLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
}

/// Append-only sink for user-facing events, consumed by the view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationLog {
    entries: BoundedLog<Notification>,
    next_id: u64,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        at: DateTime<Utc>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(Notification {
            id,
            message: message.into(),
            kind,
            timestamp: at,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>, at: DateTime<Utc>) -> u64 {
        self.push(NotificationKind::Success, message, at)
    }

    pub fn error(&mut self, message: impl Into<String>, at: DateTime<Utc>) -> u64 {
        self.push(NotificationKind::Error, message, at)
    }

    pub fn info(&mut self, message: impl Into<String>, at: DateTime<Utc>) -> u64 {
        self.push(NotificationKind::Info, message, at)
    }

    /// The entry a snackbar-style surface would show.
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.newest()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
