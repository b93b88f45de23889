//! Hook dispatcher — runs subscribers in priority order.
//!
//! Modes:
//! - **collect** ([`HookDispatcher::run`]): every subscriber receives the same
//!   payload; the result is each subscriber's return value in execution order.
//! - **single** ([`HookDispatcher::run_single`]): as collect, but only the last
//!   subscriber's value is kept (`null` when nothing is subscribed).
//! - **filter** ([`HookDispatcher::filter`]): subscriber *i*'s return value is
//!   subscriber *i+1*'s input; the value after the last subscriber is returned.
//! - **action** ([`HookDispatcher::action`]): collect mode with results discarded.
//!
//! Every mode is strict by default: the first subscriber error aborts the pass
//! and is returned to the caller. The `*_isolated` variants log the error,
//! record it in the report, and carry on with the next subscriber.
//!
//! The subscriber list is snapshotted when a pass starts. Subscribers that
//! register further subscribers only affect later passes. No timeout is
//! imposed on subscribers.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use mobster_core::error::{AppError, ErrorKind};

use super::definitions::HookValue;
use super::registry::{HookRegistry, Subscriber};

/// How subscriber errors are handled during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort on the first error and return it.
    #[default]
    Strict,
    /// Log the error, record it, and continue with the next subscriber.
    Isolated,
}

/// A subscriber error swallowed by an isolated pass.
#[derive(Debug, Clone)]
pub struct HookFailure {
    /// Module owning the failing subscriber.
    pub module_id: String,
    /// Priority the subscriber ran at.
    pub priority: i32,
    /// The error it returned.
    pub error: AppError,
}

/// Outcome of a collect-mode pass.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Values returned by successful subscribers, in execution order.
    pub results: Vec<HookValue>,
    /// Errors swallowed in isolated mode. Always empty for strict passes.
    pub failures: Vec<HookFailure>,
}

impl DispatchReport {
    /// Returns whether every subscriber succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the last successful value, or `null`.
    pub fn last_or_null(&self) -> HookValue {
        self.results.last().cloned().unwrap_or(Value::Null)
    }
}

/// Outcome of a filter pass.
#[derive(Debug, Clone)]
pub struct FilterReport {
    /// The value after the last successful subscriber.
    pub value: HookValue,
    /// Errors swallowed in isolated mode. Always empty for strict passes.
    pub failures: Vec<HookFailure>,
}

impl FilterReport {
    /// Returns whether every subscriber succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dispatches hooks to all registered subscribers.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Runs every subscriber with the same payload and collects their results.
    pub async fn run(&self, hook: &str, payload: &HookValue) -> Result<Vec<HookValue>, AppError> {
        let report = self.dispatch(hook, payload, ErrorPolicy::Strict).await?;
        Ok(report.results)
    }

    /// Runs every subscriber and returns only the last result (`null` if none).
    pub async fn run_single(&self, hook: &str, payload: &HookValue) -> Result<HookValue, AppError> {
        let mut results = self.run(hook, payload).await?;
        Ok(results.pop().unwrap_or(Value::Null))
    }

    /// Runs every subscriber, isolating failures.
    pub async fn run_isolated(&self, hook: &str, payload: &HookValue) -> DispatchReport {
        self.dispatch(hook, payload, ErrorPolicy::Isolated)
            .await
            .unwrap_or_default()
    }

    /// Pipes a value through every subscriber in order.
    pub async fn filter(&self, hook: &str, value: HookValue) -> Result<HookValue, AppError> {
        let report = self.pipe(hook, value, ErrorPolicy::Strict).await?;
        Ok(report.value)
    }

    /// Pipes a value through every subscriber, skipping failing ones.
    ///
    /// A failing subscriber leaves the value as it was before that subscriber.
    pub async fn filter_isolated(&self, hook: &str, value: HookValue) -> FilterReport {
        let fallback = value.clone();
        self.pipe(hook, value, ErrorPolicy::Isolated)
            .await
            .unwrap_or(FilterReport {
                value: fallback,
                failures: Vec::new(),
            })
    }

    /// Runs every subscriber for its side effects.
    pub async fn action(&self, hook: &str, payload: &HookValue) -> Result<(), AppError> {
        self.dispatch(hook, payload, ErrorPolicy::Strict).await?;
        Ok(())
    }

    /// Runs every subscriber for its side effects, isolating failures.
    pub async fn action_isolated(&self, hook: &str, payload: &HookValue) -> Vec<HookFailure> {
        self.run_isolated(hook, payload).await.failures
    }

    /// Collect-mode pass under an explicit error policy.
    pub async fn dispatch(
        &self,
        hook: &str,
        payload: &HookValue,
        policy: ErrorPolicy,
    ) -> Result<DispatchReport, AppError> {
        let subscribers = self.registry.subscribers(hook).await;
        let mut report = DispatchReport::default();

        if subscribers.is_empty() {
            return Ok(report);
        }

        debug!(
            hook = %hook,
            subscriber_count = subscribers.len(),
            policy = ?policy,
            "Dispatching hook"
        );

        for subscriber in &subscribers {
            match subscriber.handler.handle(payload).await {
                Ok(value) => report.results.push(value),
                Err(e) => match policy {
                    ErrorPolicy::Strict => return Err(subscriber_error(hook, subscriber, e)),
                    ErrorPolicy::Isolated => report.failures.push(isolate(hook, subscriber, e)),
                },
            }
        }

        Ok(report)
    }

    /// Filter-mode pass under an explicit error policy.
    pub async fn pipe(
        &self,
        hook: &str,
        value: HookValue,
        policy: ErrorPolicy,
    ) -> Result<FilterReport, AppError> {
        let subscribers = self.registry.subscribers(hook).await;
        let mut report = FilterReport {
            value,
            failures: Vec::new(),
        };

        if subscribers.is_empty() {
            return Ok(report);
        }

        debug!(
            hook = %hook,
            subscriber_count = subscribers.len(),
            policy = ?policy,
            "Filtering through hook"
        );

        for subscriber in &subscribers {
            match subscriber.handler.handle(&report.value).await {
                Ok(next) => report.value = next,
                Err(e) => match policy {
                    ErrorPolicy::Strict => return Err(subscriber_error(hook, subscriber, e)),
                    ErrorPolicy::Isolated => report.failures.push(isolate(hook, subscriber, e)),
                },
            }
        }

        Ok(report)
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

fn subscriber_error(hook: &str, subscriber: &Subscriber, err: AppError) -> AppError {
    debug!(
        hook = %hook,
        module_id = %subscriber.module_id,
        error = %err,
        "Subscriber failed, aborting pass"
    );

    let message = format!(
        "Subscriber '{}' on hook '{}' failed: {}",
        subscriber.module_id, hook, err.message
    );
    AppError::with_source(ErrorKind::Hook, message, err)
}

fn isolate(hook: &str, subscriber: &Subscriber, err: AppError) -> HookFailure {
    warn!(
        hook = %hook,
        module_id = %subscriber.module_id,
        priority = subscriber.priority,
        error = %err,
        "Subscriber failed, continuing"
    );

    HookFailure {
        module_id: subscriber.module_id.clone(),
        priority: subscriber.priority,
        error: err,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn dispatcher() -> HookDispatcher {
        HookDispatcher::new(Arc::new(HookRegistry::new()))
    }

    #[tokio::test]
    async fn test_unknown_hook_is_a_no_op() {
        let d = dispatcher();
        assert!(d.run("nobody", &json!({})).await.unwrap().is_empty());
        assert_eq!(d.run_single("nobody", &json!({})).await.unwrap(), Value::Null);
        assert_eq!(d.filter("nobody", json!(42)).await.unwrap(), json!(42));
        d.action("nobody", &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_hands_every_subscriber_the_original_payload() {
        let d = dispatcher();
        let r = d.registry();
        r.register_fn("x", "a", 1, |p| Ok(json!(p["n"].as_i64().unwrap_or(0) + 1)))
            .await
            .unwrap();
        r.register_fn("x", "b", 2, |p| Ok(json!(p["n"].as_i64().unwrap_or(0) + 100)))
            .await
            .unwrap();

        let results = d.run("x", &json!({"n": 1})).await.unwrap();
        assert_eq!(results, vec![json!(2), json!(101)]);
        assert_eq!(d.run_single("x", &json!({"n": 1})).await.unwrap(), json!(101));
    }

    #[tokio::test]
    async fn test_strict_run_propagates_and_stops() {
        let d = dispatcher();
        let r = d.registry();
        r.register_fn("x", "broken", 1, |_| Err(AppError::validation("no funds")))
            .await
            .unwrap();
        r.register_fn("x", "never", 2, |_| panic!("must not run"))
            .await
            .unwrap();

        let err = d.run("x", &json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Hook);
        assert!(err.message.contains("'broken'"));
        assert!(err.message.contains("no funds"));
    }

    #[tokio::test]
    async fn test_isolated_run_continues_after_failure() {
        let d = dispatcher();
        let r = d.registry();
        r.register_fn("x", "broken", 1, |_| Err(AppError::internal("boom")))
            .await
            .unwrap();
        r.register_fn("x", "fine", 2, |_| Ok(json!("ok"))).await.unwrap();

        let report = d.run_isolated("x", &json!({})).await;
        assert_eq!(report.results, vec![json!("ok")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].module_id, "broken");
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_isolated_filter_keeps_previous_value() {
        let d = dispatcher();
        let r = d.registry();
        r.register_fn("price", "double", 1, |v| Ok(json!(v.as_i64().unwrap_or(0) * 2)))
            .await
            .unwrap();
        r.register_fn("price", "broken", 2, |_| Err(AppError::internal("boom")))
            .await
            .unwrap();
        r.register_fn("price", "plus-one", 3, |v| Ok(json!(v.as_i64().unwrap_or(0) + 1)))
            .await
            .unwrap();

        let report = d.filter_isolated("price", json!(10)).await;
        assert_eq!(report.value, json!(21));
        assert_eq!(report.failures.len(), 1);

        assert!(d.filter("price", json!(10)).await.is_err());
    }
}
