//! Module registry — stores bootstrapped game modules and their metadata.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use mobster_core::error::AppError;

use crate::exports::ModuleExport;

/// Metadata about a game module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Unique module identifier, also the key of its config section.
    pub id: String,
    /// Human-readable module name.
    pub name: String,
    /// Module version string.
    pub version: String,
    /// Module description.
    pub description: String,
    /// Bootstrap order (lower = registered first).
    pub load_order: i32,
}

/// Trait that all game modules implement.
///
/// A module describes the subscribers it wants through [`GameModule::exports`];
/// the [`ModuleManager`](crate::manager::ModuleManager) does the registering.
#[async_trait]
pub trait GameModule: Send + Sync + std::fmt::Debug {
    /// Returns module metadata.
    fn info(&self) -> ModuleInfo;

    /// Called once before the module's subscribers are registered.
    async fn on_load(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Called after the module's subscribers are removed.
    async fn on_unload(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Returns the subscribers this module wants registered.
    fn exports(&self) -> ModuleExport;
}

/// Registry of all bootstrapped modules.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    /// Module ID → module instance.
    modules: RwLock<HashMap<String, Arc<dyn GameModule>>>,
    /// Module ID → metadata.
    metadata: RwLock<HashMap<String, ModuleInfo>>,
}

impl ModuleRegistry {
    /// Creates a new empty module registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module. Fails if the id is already taken.
    pub async fn register(&self, module: Arc<dyn GameModule>) -> Result<(), AppError> {
        let info = module.info();
        let id = info.id.clone();

        let mut modules = self.modules.write().await;
        let mut metadata = self.metadata.write().await;

        if modules.contains_key(&id) {
            return Err(AppError::conflict(format!(
                "Module '{id}' is already registered"
            )));
        }

        info!(module_id = %id, name = %info.name, version = %info.version, "Registering module");

        modules.insert(id.clone(), module);
        metadata.insert(id, info);

        Ok(())
    }

    /// Unregisters a module by ID.
    pub async fn unregister(&self, module_id: &str) -> Result<Arc<dyn GameModule>, AppError> {
        let mut modules = self.modules.write().await;
        let mut metadata = self.metadata.write().await;

        let module = modules
            .remove(module_id)
            .ok_or_else(|| AppError::not_found(format!("Module '{module_id}' not found")))?;

        metadata.remove(module_id);

        info!(module_id = %module_id, "Module unregistered");

        Ok(module)
    }

    /// Lists module metadata in load order.
    pub async fn list(&self) -> Vec<ModuleInfo> {
        let metadata = self.metadata.read().await;
        let mut infos: Vec<ModuleInfo> = metadata.values().cloned().collect();
        infos.sort_by(|a, b| a.load_order.cmp(&b.load_order).then_with(|| a.id.cmp(&b.id)));
        infos
    }

    /// Returns module count.
    pub async fn count(&self) -> usize {
        let modules = self.modules.read().await;
        modules.len()
    }

    /// Checks whether a module is registered.
    pub async fn contains(&self, module_id: &str) -> bool {
        let modules = self.modules.read().await;
        modules.contains_key(module_id)
    }
}
