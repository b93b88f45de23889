//! Drugs module — marks up street prices and logs sales.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use mobster_core::config::ModulesConfig;
use mobster_core::error::AppError;
use mobster_hooks::hooks::names;
use mobster_hooks::prelude::*;

use crate::activity::ActivityLog;

/// Module id.
pub const MODULE_ID: &str = "drugs";

const DEFAULT_MARKUP_PERCENT: i64 = 0;

fn apply_markup(value: &HookValue, markup_percent: i64) -> Result<HookValue, AppError> {
    let mut payload = HookPayload::from_value(value.clone())?;
    let price = payload.require_i64("price")?;

    let marked_up = price.saturating_mul(100i64.saturating_add(markup_percent)) / 100;
    payload.set("price", json!(marked_up.max(0)));

    Ok(payload.into_value())
}

#[derive(Debug)]
struct SaleRecordedHook {
    log: Arc<ActivityLog>,
}

#[async_trait]
impl HookHandler for SaleRecordedHook {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        let payload = HookPayload::from_value(payload.clone())?;
        let user = payload.require_i64("user_id")?;
        let quantity = payload.require_i64("quantity")?;
        let drug = payload.get_string("drug").unwrap_or("unknown");

        self.log
            .record(
                MODULE_ID,
                names::AFTER_DRUG_SALE,
                format!("user {user} sold {quantity} x {drug}"),
            )
            .await;

        Ok(Value::Null)
    }

    fn module_id(&self) -> &str {
        MODULE_ID
    }
}

/// The drugs module.
#[derive(Debug)]
pub struct DrugsModule {
    log: Arc<ActivityLog>,
    markup_percent: i64,
}

impl DrugsModule {
    /// Create the module with no markup.
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self {
            log,
            markup_percent: DEFAULT_MARKUP_PERCENT,
        }
    }

    /// Create the module reading `markup_percent` (at least -100) from its config section.
    pub fn from_config(config: &ModulesConfig, log: Arc<ActivityLog>) -> Self {
        let mut module = Self::new(log);
        if let Some(markup) = config.setting_i64(MODULE_ID, "markup_percent") {
            module.markup_percent = markup.max(-100);
        }
        module
    }
}

#[async_trait]
impl GameModule for DrugsModule {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: MODULE_ID.to_string(),
            name: "Drugs".to_string(),
            version: "1.0.0".to_string(),
            description: "Street prices and sales".to_string(),
            load_order: 40,
        }
    }

    fn exports(&self) -> ModuleExport {
        let markup = self.markup_percent;

        ModuleExport::new(MODULE_ID)
            .on_fn(names::ALTER_DRUG_PRICE, DEFAULT_PRIORITY, move |v| {
                apply_markup(v, markup)
            })
            .on(
                names::AFTER_DRUG_SALE,
                DEFAULT_PRIORITY,
                Arc::new(SaleRecordedHook {
                    log: self.log.clone(),
                }),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup() {
        let out = apply_markup(&json!({"drug": "weed", "price": 250}), 20).unwrap();
        assert_eq!(out, json!({"drug": "weed", "price": 300}));

        let out = apply_markup(&json!({"price": 250}), -100).unwrap();
        assert_eq!(out["price"], json!(0));
    }

    #[test]
    fn test_markup_needs_price() {
        assert!(apply_markup(&json!({"drug": "weed"}), 20).is_err());
    }

    #[test]
    fn test_markup_saturates() {
        let out = apply_markup(&json!({"price": 250}), i64::MAX).unwrap();
        assert_eq!(out["price"], json!(i64::MAX / 100));
    }
}
