//! Payload and subscription types shared by the registry and dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use mobster_core::error::AppError;

/// Value handed to and returned from every subscriber.
///
/// The dispatcher never inspects it. The shape for each hook is a
/// convention between the call site and the modules subscribing to it.
pub type HookValue = Value;

/// Priority used when a subscriber does not ask for one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Object payload builder — a flexible key-value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookPayload {
    /// Arbitrary data keyed by string.
    data: Map<String, Value>,
}

impl HookPayload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing value, which must be a JSON object.
    pub fn from_value(value: HookValue) -> Result<Self, AppError> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            Value::Null => Ok(Self::new()),
            other => Err(AppError::validation(format!(
                "Hook payload must be an object, got {other}"
            ))),
        }
    }

    /// Inserts a value.
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Inserts a string value.
    pub fn with_string(self, key: &str, value: &str) -> Self {
        self.with_data(key, Value::from(value))
    }

    /// Inserts an integer value.
    pub fn with_int(self, key: &str, value: i64) -> Self {
        self.with_data(key, Value::from(value))
    }

    /// Inserts a boolean value.
    pub fn with_bool(self, key: &str, value: bool) -> Self {
        self.with_data(key, Value::from(value))
    }

    /// Sets a value in place.
    pub fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    /// Gets a value by key.
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets a string value.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// Gets an i64 value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(|v| v.as_i64())
    }

    /// Gets a bool value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(|v| v.as_bool())
    }

    /// Gets an i64 value, failing with a validation error when absent.
    pub fn require_i64(&self, key: &str) -> Result<i64, AppError> {
        self.get_i64(key)
            .ok_or_else(|| AppError::validation(format!("Payload field '{key}' must be an integer")))
    }

    /// Returns whether the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Converts the payload into a [`HookValue`].
    pub fn into_value(self) -> HookValue {
        Value::Object(self.data)
    }
}

impl From<HookPayload> for Value {
    fn from(payload: HookPayload) -> Self {
        payload.into_value()
    }
}

/// A request to subscribe to a hook at a given priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSubscription {
    /// The hook name to subscribe to.
    pub hook: String,
    /// Priority (lower = runs earlier).
    pub priority: i32,
}

impl HookSubscription {
    /// Creates a new hook subscription.
    pub fn new(hook: &str, priority: i32) -> Self {
        Self {
            hook: hook.to_string(),
            priority,
        }
    }

    /// Creates a subscription with [`DEFAULT_PRIORITY`].
    pub fn default_priority(hook: &str) -> Self {
        Self::new(hook, DEFAULT_PRIORITY)
    }

    /// Returns a copy shifted by the given priority offset.
    pub fn offset(&self, offset: i32) -> Self {
        Self {
            hook: self.hook.clone(),
            priority: self.priority.saturating_add(offset),
        }
    }
}
