//! Prelude for module authors.

pub use async_trait::async_trait;

pub use crate::exports::{ModuleExport, ModuleHook};
pub use crate::hook_payload;
pub use crate::hooks::definitions::{DEFAULT_PRIORITY, HookPayload, HookSubscription, HookValue};
pub use crate::hooks::dispatcher::{ErrorPolicy, HookDispatcher};
pub use crate::hooks::names;
pub use crate::hooks::registry::{HookHandler, HookRegistry};
pub use crate::registry::{GameModule, ModuleInfo};
pub use crate::traits::{AsyncFnHandler, FnHandler};
