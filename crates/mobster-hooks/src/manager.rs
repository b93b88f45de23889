//! Module manager — bootstraps game modules into the hook registry.
//!
//! Bootstrap is meant to run once, at process start, before any request is
//! served. Running it again without clearing the registry duplicates every
//! subscriber; that is allowed, not prevented.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use mobster_core::config::ModulesConfig;
use mobster_core::error::{AppError, ErrorKind};

use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::names;
use crate::hooks::registry::HookRegistry;
use crate::registry::{GameModule, ModuleInfo, ModuleRegistry};

/// Summary of a bootstrap run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// Modules loaded, in load order.
    pub loaded: Vec<String>,
    /// Modules skipped because their config disables them.
    pub skipped: Vec<String>,
    /// Total subscribers registered.
    pub subscribers: usize,
}

/// Manages the lifecycle of game modules: load, register, unload.
#[derive(Debug)]
pub struct ModuleManager {
    /// Module registry.
    module_registry: Arc<ModuleRegistry>,
    /// Hook registry.
    hook_registry: Arc<HookRegistry>,
    /// Hook dispatcher.
    hook_dispatcher: Arc<HookDispatcher>,
}

impl ModuleManager {
    /// Creates a new module manager around a fresh hook registry.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(HookRegistry::new()))
    }

    /// Creates a module manager around an existing hook registry.
    pub fn with_registry(hook_registry: Arc<HookRegistry>) -> Self {
        let hook_dispatcher = Arc::new(HookDispatcher::new(hook_registry.clone()));

        Self {
            module_registry: Arc::new(ModuleRegistry::new()),
            hook_registry,
            hook_dispatcher,
        }
    }

    /// Loads every enabled module, in `load_order`.
    ///
    /// Modules with equal `load_order` keep the order they were given in.
    /// The first module that fails to load aborts the bootstrap.
    pub async fn bootstrap(
        &self,
        mut modules: Vec<Arc<dyn GameModule>>,
        config: &ModulesConfig,
    ) -> Result<BootstrapReport, AppError> {
        modules.sort_by_key(|m| m.info().load_order);

        let mut report = BootstrapReport::default();

        for module in modules {
            let id = module.info().id;

            if !config.is_enabled(&id) {
                info!(module_id = %id, "Module disabled by configuration, skipping");
                report.skipped.push(id);
                continue;
            }

            let registered = self
                .load_module(module, config.priority_offset(&id))
                .await?;

            report.subscribers += registered;
            report.loaded.push(id);
        }

        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            subscribers = report.subscribers,
            "Module bootstrap complete"
        );

        Ok(report)
    }

    /// Loads a single module, shifting every requested priority by `priority_offset`.
    ///
    /// Returns the number of subscribers registered.
    pub async fn load_module(
        &self,
        module: Arc<dyn GameModule>,
        priority_offset: i32,
    ) -> Result<usize, AppError> {
        let info = module.info();
        let module_id = info.id.clone();

        module.on_load().await.map_err(|e| {
            error!(module_id = %module_id, error = %e, "Module load failed");
            AppError::with_source(
                ErrorKind::Module,
                format!("Module '{module_id}' load failed: {}", e.message),
                e,
            )
        })?;

        let export = module.exports();
        if export.module_id != module_id {
            return Err(AppError::module(format!(
                "Module '{}' exported subscribers under id '{}'",
                module_id, export.module_id
            )));
        }
        if let Some(hook) = export
            .hooks
            .iter()
            .find(|h| h.handler.module_id() != module_id)
        {
            return Err(AppError::module(format!(
                "Module '{}' exported a subscriber on '{}' owned by '{}'",
                module_id,
                hook.subscription.hook,
                hook.handler.module_id()
            )));
        }

        self.module_registry.register(module.clone()).await?;

        let mut registered = 0;
        for hook in &export.hooks {
            let subscription = hook.subscription.offset(priority_offset);
            if let Err(e) = self
                .hook_registry
                .subscribe(&subscription, hook.handler.clone())
                .await
            {
                let removed = self.hook_registry.unregister_module(&module_id).await;
                if let Err(rollback) = self.module_registry.unregister(&module_id).await {
                    warn!(
                        module_id = %module_id,
                        error = %rollback,
                        "Module rollback could not unregister module"
                    );
                }
                warn!(module_id = %module_id, removed = removed, "Module registration rolled back");
                return Err(AppError::with_source(
                    ErrorKind::Module,
                    format!("Module '{module_id}' registration failed: {}", e.message),
                    e,
                ));
            }
            registered += 1;
        }

        info!(
            module_id = %module_id,
            name = %info.name,
            version = %info.version,
            subscribers = registered,
            priority_offset = priority_offset,
            "Module loaded"
        );

        let failures = self
            .hook_dispatcher
            .action_isolated(names::MODULE_LOADED, &json!({ "module_id": module_id }))
            .await;
        if !failures.is_empty() {
            warn!(
                module_id = %module_id,
                failures = failures.len(),
                "Module-loaded listeners failed"
            );
        }

        Ok(registered)
    }

    /// Removes a module's subscribers and unloads it.
    pub async fn unload_module(&self, module_id: &str) -> Result<usize, AppError> {
        if !self.module_registry.contains(module_id).await {
            return Err(AppError::not_found(format!(
                "Module '{module_id}' not found"
            )));
        }

        let removed = self.hook_registry.unregister_module(module_id).await;
        let module = self.module_registry.unregister(module_id).await?;

        if let Err(e) = module.on_unload().await {
            warn!(
                module_id = %module_id,
                error = %e,
                "Module unload returned error"
            );
        }

        info!(module_id = %module_id, removed = removed, "Module unloaded");

        Ok(removed)
    }

    /// Unloads every module.
    pub async fn unload_all(&self) {
        for info in self.module_registry.list().await {
            if let Err(e) = self.unload_module(&info.id).await {
                error!(module_id = %info.id, error = %e, "Error unloading module");
            }
        }

        info!("All modules unloaded");
    }

    /// Returns the hook dispatcher for firing hooks.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.hook_dispatcher
    }

    /// Returns the hook registry.
    pub fn hook_registry(&self) -> &Arc<HookRegistry> {
        &self.hook_registry
    }

    /// Returns the module registry.
    pub fn module_registry(&self) -> &Arc<ModuleRegistry> {
        &self.module_registry
    }

    /// Lists all loaded modules.
    pub async fn list_modules(&self) -> Vec<ModuleInfo> {
        self.module_registry.list().await
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}
