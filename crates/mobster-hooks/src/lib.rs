//! # mobster-hooks
//!
//! In-process hook bus for Mobster. Provides:
//!
//! - Hook registry with priority-ordered, registration-stable subscribers
//! - Hook dispatcher with collect, single, filter and action modes, each
//!   available with strict (propagate) or isolated (log and continue)
//!   error handling
//! - Introspection for debug tooling
//! - Game module bootstrap: module registry, exports and lifecycle manager

pub mod exports;
pub mod hooks;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod traits;

pub use exports::{ModuleExport, ModuleHook};
pub use hooks::definitions::{DEFAULT_PRIORITY, HookPayload, HookSubscription, HookValue};
pub use hooks::dispatcher::{DispatchReport, ErrorPolicy, FilterReport, HookDispatcher, HookFailure};
pub use hooks::introspection::{HookDebugInfo, HookSummary, SubscriberInfo};
pub use hooks::registry::{HookHandler, HookRegistry, Subscriber};
pub use manager::{BootstrapReport, ModuleManager};
pub use registry::{GameModule, ModuleInfo, ModuleRegistry};
pub use traits::{AsyncFnHandler, FnHandler};
