//! Built-in game modules for Mobster.
//!
//! Each module registers subscribers on the hook bus at bootstrap and keeps
//! its own state; the game flow only ever talks to the dispatcher. The
//! [`flows`] module holds the typed call sites that fire those hooks.

pub mod activity;
pub mod bank;
pub mod combat;
pub mod drugs;
pub mod flows;
pub mod jail;

use std::sync::Arc;

use mobster_core::config::ModulesConfig;
use mobster_hooks::GameModule;

pub use activity::{ActivityEntry, ActivityLog};
pub use bank::BankModule;
pub use combat::CombatModule;
pub use drugs::DrugsModule;
pub use jail::JailModule;

/// Builds every built-in module from configuration.
///
/// Disabled modules are still constructed; the module manager decides
/// whether to load them.
pub fn default_modules(config: &ModulesConfig, log: Arc<ActivityLog>) -> Vec<Arc<dyn GameModule>> {
    vec![
        Arc::new(CombatModule::new(log.clone())),
        Arc::new(JailModule::from_config(config, log.clone())),
        Arc::new(BankModule::from_config(config, log.clone())),
        Arc::new(DrugsModule::from_config(config, log)),
    ]
}
