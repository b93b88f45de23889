//! Serializable snapshot of the registry for debug tooling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-hook subscriber counts and priorities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDebugInfo {
    /// Hook name → summary, ordered by name.
    pub hooks: BTreeMap<String, HookSummary>,
}

/// Summary of one hook's subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSummary {
    /// Number of subscribers.
    pub count: usize,
    /// Subscribers in execution order.
    pub subscribers: Vec<SubscriberInfo>,
}

/// One subscriber, as seen by diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberInfo {
    /// Owning module.
    pub module_id: String,
    /// Priority.
    pub priority: i32,
    /// Registration sequence number.
    pub sequence: u64,
}

impl HookDebugInfo {
    /// Total number of subscribers across all hooks.
    pub fn total_subscribers(&self) -> usize {
        self.hooks.values().map(|h| h.count).sum()
    }

    /// Returns whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl HookSummary {
    /// Priorities in execution order.
    pub fn priorities(&self) -> Vec<i32> {
        self.subscribers.iter().map(|s| s.priority).collect()
    }
}
