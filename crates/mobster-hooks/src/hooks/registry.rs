//! Hook registry — modules register subscribers by hook name with priority ordering.
//!
//! Subscribers for a hook are kept sorted by `(priority, sequence)`, where
//! `sequence` is a registry-wide registration counter. Lower priorities run
//! first; equal priorities run in registration order.
//!
//! Readers never hold the lock while a subscriber runs: [`HookRegistry::subscribers`]
//! clones the list, so a dispatch pass always sees the registry as it was when
//! the pass started.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use mobster_core::error::AppError;

use super::definitions::{HookSubscription, HookValue};
use super::introspection::{HookDebugInfo, HookSummary, SubscriberInfo};
use crate::traits::FnHandler;

/// Trait for hook subscriber implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Handles a hook invocation.
    ///
    /// In collect/action mode every subscriber receives the caller's payload.
    /// In filter mode it receives the previous subscriber's return value.
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError>;

    /// Returns the id of the module owning this subscriber.
    fn module_id(&self) -> &str;
}

/// A registered subscriber.
#[derive(Debug, Clone)]
pub struct Subscriber {
    /// The handler.
    pub handler: Arc<dyn HookHandler>,
    /// Priority (lower = earlier execution).
    pub priority: i32,
    /// Registration sequence number, unique within the registry.
    pub sequence: u64,
    /// Module that registered this subscriber.
    pub module_id: String,
}

/// Registry of hook subscribers organized by hook name.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Hook name → sorted list of subscribers.
    hooks: RwLock<HashMap<String, Vec<Subscriber>>>,
    /// Next registration sequence number.
    next_sequence: AtomicU64,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for a hook name.
    ///
    /// Fails with a validation error if the hook name or the handler's module
    /// id is blank. Registering the same handler twice keeps both entries.
    pub async fn register(
        &self,
        hook: &str,
        priority: i32,
        handler: Arc<dyn HookHandler>,
    ) -> Result<(), AppError> {
        if hook.trim().is_empty() {
            return Err(AppError::validation("Hook name must not be empty"));
        }

        let module_id = handler.module_id().to_string();
        if module_id.trim().is_empty() {
            return Err(AppError::validation(format!(
                "Subscriber for hook '{hook}' has an empty module id"
            )));
        }

        let mut hooks = self.hooks.write().await;
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let entries = hooks.entry(hook.to_string()).or_default();

        entries.push(Subscriber {
            handler,
            priority,
            sequence,
            module_id: module_id.clone(),
        });

        entries.sort_by_key(|e| (e.priority, e.sequence));

        info!(
            hook = %hook,
            module_id = %module_id,
            priority = priority,
            sequence = sequence,
            "Hook subscriber registered"
        );

        Ok(())
    }

    /// Registers a subscriber described by a [`HookSubscription`].
    pub async fn subscribe(
        &self,
        subscription: &HookSubscription,
        handler: Arc<dyn HookHandler>,
    ) -> Result<(), AppError> {
        self.register(&subscription.hook, subscription.priority, handler)
            .await
    }

    /// Registers a synchronous closure as a subscriber.
    pub async fn register_fn<F>(
        &self,
        hook: &str,
        module_id: &str,
        priority: i32,
        f: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&HookValue) -> Result<HookValue, AppError> + Send + Sync + 'static,
    {
        self.register(hook, priority, Arc::new(FnHandler::new(module_id, f)))
            .await
    }

    /// Returns a snapshot of the subscribers for a hook, in execution order.
    pub async fn subscribers(&self, hook: &str) -> Vec<Subscriber> {
        let hooks = self.hooks.read().await;
        hooks.get(hook).cloned().unwrap_or_default()
    }

    /// Returns whether any subscribers are registered for a hook.
    pub async fn has(&self, hook: &str) -> bool {
        let hooks = self.hooks.read().await;
        hooks
            .get(hook)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// Returns the number of subscribers registered for a hook.
    pub async fn count(&self, hook: &str) -> usize {
        let hooks = self.hooks.read().await;
        hooks.get(hook).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Removes every subscriber for a single hook. Returns how many were removed.
    pub async fn clear(&self, hook: &str) -> usize {
        let mut hooks = self.hooks.write().await;
        let removed = hooks.remove(hook).map(|entries| entries.len()).unwrap_or(0);

        if removed > 0 {
            info!(hook = %hook, removed = removed, "Hook cleared");
        }

        removed
    }

    /// Removes every subscriber for every hook.
    pub async fn clear_all(&self) {
        let mut hooks = self.hooks.write().await;
        let removed: usize = hooks.values().map(Vec::len).sum();
        hooks.clear();

        info!(removed = removed, "All hooks cleared");
    }

    /// Removes every subscriber a module registered. Returns how many were removed.
    pub async fn unregister_module(&self, module_id: &str) -> usize {
        let mut hooks = self.hooks.write().await;
        let mut removed = 0;

        for entries in hooks.values_mut() {
            let before = entries.len();
            entries.retain(|e| e.module_id != module_id);
            removed += before - entries.len();
        }

        hooks.retain(|_, entries| !entries.is_empty());

        info!(module_id = %module_id, removed = removed, "Hooks unregistered for module");

        removed
    }

    /// Returns every hook name with at least one subscriber, sorted.
    pub async fn hook_names(&self) -> Vec<String> {
        let hooks = self.hooks.read().await;
        let mut names: Vec<String> = hooks
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Returns per-hook subscriber counts and priorities for diagnostics.
    pub async fn debug_info(&self) -> HookDebugInfo {
        let hooks = self.hooks.read().await;

        let summaries = hooks
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(name, entries)| {
                let subscribers = entries
                    .iter()
                    .map(|e| SubscriberInfo {
                        module_id: e.module_id.clone(),
                        priority: e.priority,
                        sequence: e.sequence,
                    })
                    .collect();

                (
                    name.clone(),
                    HookSummary {
                        count: entries.len(),
                        subscribers,
                    },
                )
            })
            .collect();

        debug!(hooks = hooks.len(), "Collected hook debug info");

        HookDebugInfo { hooks: summaries }
    }
}
