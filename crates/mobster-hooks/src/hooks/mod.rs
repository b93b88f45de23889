//! Hook system — names, registry, dispatcher, and introspection.

pub mod definitions;
pub mod dispatcher;
pub mod introspection;
pub mod names;
pub mod registry;

pub use definitions::{DEFAULT_PRIORITY, HookPayload, HookSubscription, HookValue};
pub use dispatcher::{DispatchReport, ErrorPolicy, FilterReport, HookDispatcher, HookFailure};
pub use introspection::HookDebugInfo;
pub use registry::{HookHandler, HookRegistry, Subscriber};
