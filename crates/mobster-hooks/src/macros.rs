//! Convenience macros for building hook payloads.

/// Builds an object [`HookValue`](crate::hooks::definitions::HookValue).
///
/// # Example
/// ```rust
/// use mobster_hooks::hook_payload;
/// use serde_json::json;
///
/// let payload = hook_payload!({
///     "user_id" => json!(7),
///     "amount" => json!(1_000),
/// });
/// assert_eq!(payload["amount"], 1_000);
/// ```
#[macro_export]
macro_rules! hook_payload {
    () => {
        $crate::hooks::definitions::HookPayload::new().into_value()
    };
    ({ $($key:expr => $value:expr),* $(,)? }) => {{
        let mut payload = $crate::hooks::definitions::HookPayload::new();
        $(
            payload.set($key, $value);
        )*
        payload.into_value()
    }};
}
