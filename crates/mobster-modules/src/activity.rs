//! In-memory activity log shared by the built-in modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

/// One recorded game event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Module that recorded the entry.
    pub module_id: String,
    /// Hook that triggered it.
    pub hook: String,
    /// Human-readable description.
    pub message: String,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Append-only activity log.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Mutex<Vec<ActivityEntry>>,
}

impl ActivityLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub async fn record(&self, module_id: &str, hook: &str, message: impl Into<String>) {
        let entry = ActivityEntry {
            module_id: module_id.to_string(),
            hook: hook.to_string(),
            message: message.into(),
            recorded_at: Utc::now(),
        };

        debug!(module_id = %entry.module_id, hook = %entry.hook, message = %entry.message, "Activity recorded");

        self.entries.lock().await.push(entry);
    }

    /// Returns every entry, oldest first.
    pub async fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().await.clone()
    }

    /// Returns the messages recorded by one module, oldest first.
    pub async fn messages_for(&self, module_id: &str) -> Vec<String> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|e| e.module_id == module_id)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns whether nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
