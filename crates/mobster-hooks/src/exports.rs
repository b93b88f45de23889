//! Export bundles describing the subscribers a module registers.

use std::sync::Arc;

use mobster_core::error::AppError;

use crate::hooks::definitions::{HookSubscription, HookValue};
use crate::hooks::registry::HookHandler;
use crate::traits::FnHandler;

/// One subscriber a module wants registered.
#[derive(Debug, Clone)]
pub struct ModuleHook {
    /// Hook name and requested priority.
    pub subscription: HookSubscription,
    /// The subscriber.
    pub handler: Arc<dyn HookHandler>,
}

/// All subscribers a module wants registered, in declaration order.
#[derive(Debug, Clone)]
pub struct ModuleExport {
    /// Owning module.
    pub module_id: String,
    /// Subscribers to register.
    pub hooks: Vec<ModuleHook>,
}

impl ModuleExport {
    /// Creates a new export with no subscribers.
    pub fn new(module_id: &str) -> Self {
        Self {
            module_id: module_id.to_string(),
            hooks: Vec::new(),
        }
    }

    /// Adds a subscriber.
    pub fn on(mut self, hook: &str, priority: i32, handler: Arc<dyn HookHandler>) -> Self {
        self.hooks.push(ModuleHook {
            subscription: HookSubscription::new(hook, priority),
            handler,
        });
        self
    }

    /// Adds a synchronous closure subscriber owned by this module.
    pub fn on_fn<F>(self, hook: &str, priority: i32, f: F) -> Self
    where
        F: Fn(&HookValue) -> Result<HookValue, AppError> + Send + Sync + 'static,
    {
        let handler = Arc::new(FnHandler::new(&self.module_id, f));
        self.on(hook, priority, handler)
    }

    /// Number of subscribers in the export.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns whether the export has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
