//! Closure adapters for the [`HookHandler`] trait.
//!
//! Modules that need no state beyond what a closure captures register
//! through these instead of writing a handler struct.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use mobster_core::error::AppError;

use crate::hooks::definitions::HookValue;
use crate::hooks::registry::HookHandler;

type SyncFn = dyn Fn(&HookValue) -> Result<HookValue, AppError> + Send + Sync;
type AsyncFn = dyn Fn(HookValue) -> BoxFuture<'static, Result<HookValue, AppError>> + Send + Sync;

/// A subscriber backed by a synchronous closure.
pub struct FnHandler {
    /// Module id.
    id: String,
    /// Handler function.
    handler: Arc<SyncFn>,
}

impl std::fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler")
            .field("id", &self.id)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl FnHandler {
    /// Creates a new closure-based subscriber.
    pub fn new<F>(module_id: &str, handler: F) -> Self
    where
        F: Fn(&HookValue) -> Result<HookValue, AppError> + Send + Sync + 'static,
    {
        Self {
            id: module_id.to_string(),
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl HookHandler for FnHandler {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        (self.handler)(payload)
    }

    fn module_id(&self) -> &str {
        &self.id
    }
}

/// A subscriber backed by a closure returning a future.
///
/// The closure receives an owned copy of the payload so the future can be
/// `'static`.
pub struct AsyncFnHandler {
    /// Module id.
    id: String,
    /// Handler function.
    handler: Arc<AsyncFn>,
}

impl std::fmt::Debug for AsyncFnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnHandler")
            .field("id", &self.id)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl AsyncFnHandler {
    /// Creates a new async closure-based subscriber.
    pub fn new<F, Fut>(module_id: &str, handler: F) -> Self
    where
        F: Fn(HookValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HookValue, AppError>> + Send + 'static,
    {
        Self {
            id: module_id.to_string(),
            handler: Arc::new(move |payload| {
                let fut: BoxFuture<'static, Result<HookValue, AppError>> = Box::pin(handler(payload));
                fut
            }),
        }
    }
}

#[async_trait]
impl HookHandler for AsyncFnHandler {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        (self.handler)(payload.clone()).await
    }

    fn module_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_fn_handler() {
        let handler = FnHandler::new("drugs", |v| Ok(json!(v.as_i64().unwrap_or(0) + 5)));
        assert_eq!(handler.module_id(), "drugs");
        assert_eq!(handler.handle(&json!(10)).await.unwrap(), json!(15));
    }

    #[tokio::test]
    async fn test_async_fn_handler() {
        let handler = AsyncFnHandler::new("bank", |v| async move {
            tokio::task::yield_now().await;
            Ok(json!({"seen": v}))
        });
        assert_eq!(handler.module_id(), "bank");
        assert_eq!(
            handler.handle(&json!(3)).await.unwrap(),
            json!({"seen": 3})
        );
    }
}
