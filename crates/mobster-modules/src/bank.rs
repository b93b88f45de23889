//! Bank module — charges a deposit fee and records deposits.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use mobster_core::config::ModulesConfig;
use mobster_core::error::AppError;
use mobster_hooks::hooks::names;
use mobster_hooks::prelude::*;

use crate::activity::ActivityLog;

/// Module id.
pub const MODULE_ID: &str = "bank";

const DEFAULT_FEE_PERCENT: i64 = 2;

/// Applies a percentage fee to `amount`, accumulating it into `fee`.
///
/// The fee is rounded down. Non-positive deposits are rejected.
fn charge_fee(value: &HookValue, fee_percent: i64) -> Result<HookValue, AppError> {
    let mut payload = HookPayload::from_value(value.clone())?;
    let amount = payload.require_i64("amount")?;

    if amount <= 0 {
        return Err(AppError::validation(format!(
            "Deposit amount must be positive, got {amount}"
        )));
    }

    let fee = amount.saturating_mul(fee_percent) / 100;
    let charged = payload.get_i64("fee").unwrap_or(0).saturating_add(fee);

    payload.set("amount", json!(amount - fee));
    payload.set("fee", json!(charged));

    Ok(payload.into_value())
}

/// Hook handler for afterBankDeposit: record the deposit.
#[derive(Debug)]
struct DepositRecordedHook {
    log: Arc<ActivityLog>,
}

#[async_trait]
impl HookHandler for DepositRecordedHook {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        let payload = HookPayload::from_value(payload.clone())?;
        let user = payload.require_i64("user_id")?;
        let amount = payload.require_i64("amount")?;
        let fee = payload.get_i64("fee").unwrap_or(0);

        self.log
            .record(
                MODULE_ID,
                names::AFTER_BANK_DEPOSIT,
                format!("user {user} deposited ${amount} (fee ${fee})"),
            )
            .await;

        Ok(Value::Null)
    }

    fn module_id(&self) -> &str {
        MODULE_ID
    }
}

/// The bank module.
#[derive(Debug)]
pub struct BankModule {
    log: Arc<ActivityLog>,
    fee_percent: i64,
}

impl BankModule {
    /// Create the module with the default fee.
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self {
            log,
            fee_percent: DEFAULT_FEE_PERCENT,
        }
    }

    /// Create the module reading `fee_percent` (0–100) from its config section.
    pub fn from_config(config: &ModulesConfig, log: Arc<ActivityLog>) -> Self {
        let mut module = Self::new(log);
        if let Some(fee) = config.setting_i64(MODULE_ID, "fee_percent") {
            module.fee_percent = fee.clamp(0, 100);
        }
        module
    }

    /// The configured fee percentage.
    pub fn fee_percent(&self) -> i64 {
        self.fee_percent
    }
}

#[async_trait]
impl GameModule for BankModule {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: MODULE_ID.to_string(),
            name: "Bank".to_string(),
            version: "1.0.0".to_string(),
            description: "Deposits and fees".to_string(),
            load_order: 30,
        }
    }

    fn exports(&self) -> ModuleExport {
        let fee_percent = self.fee_percent;

        ModuleExport::new(MODULE_ID)
            .on_fn(names::BEFORE_BANK_DEPOSIT, DEFAULT_PRIORITY, move |v| {
                charge_fee(v, fee_percent)
            })
            .on(
                names::AFTER_BANK_DEPOSIT,
                DEFAULT_PRIORITY,
                Arc::new(DepositRecordedHook {
                    log: self.log.clone(),
                }),
            )
            .on_fn(names::CUSTOM_MENUS, 30, |_| {
                Ok(json!([{ "module": MODULE_ID, "label": "Bank", "route": "/bank" }]))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_fee_rounds_down() {
        let out = charge_fee(&json!({"user_id": 1, "amount": 149}), 2).unwrap();
        assert_eq!(out["amount"], json!(147));
        assert_eq!(out["fee"], json!(2));
    }

    #[test]
    fn test_charge_fee_accumulates() {
        let out = charge_fee(&json!({"amount": 1000, "fee": 5}), 10).unwrap();
        assert_eq!(out["amount"], json!(900));
        assert_eq!(out["fee"], json!(105));
    }

    #[test]
    fn test_charge_fee_rejects_non_positive() {
        assert!(charge_fee(&json!({"amount": 0}), 2).is_err());
        assert!(charge_fee(&json!({"amount": "lots"}), 2).is_err());
    }

    #[test]
    fn test_fee_percent_clamped() {
        let mut config = ModulesConfig::default();
        config
            .modules
            .entry(MODULE_ID.to_string())
            .or_default()
            .extra
            .insert("fee_percent".to_string(), json!(250));

        let module = BankModule::from_config(&config, Arc::new(ActivityLog::new()));
        assert_eq!(module.fee_percent(), 100);
    }
}
