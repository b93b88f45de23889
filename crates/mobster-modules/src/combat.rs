//! Combat module — records fight outcomes and refuses self-attacks.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use mobster_core::error::AppError;
use mobster_hooks::hooks::names;
use mobster_hooks::prelude::*;

use crate::activity::ActivityLog;

/// Module id.
pub const MODULE_ID: &str = "combat";

/// Hook handler for afterCombat: log the outcome.
#[derive(Debug)]
pub struct AfterCombatHook {
    /// Activity log
    log: Arc<ActivityLog>,
}

impl AfterCombatHook {
    /// Create a new afterCombat handler
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl HookHandler for AfterCombatHook {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        let payload = HookPayload::from_value(payload.clone())?;
        let winner = payload.require_i64("winner_id")?;
        let loser = payload.require_i64("loser_id")?;

        self.log
            .record(
                MODULE_ID,
                names::AFTER_COMBAT,
                format!("user {winner} beat user {loser}"),
            )
            .await;

        Ok(json!({ "module": MODULE_ID, "logged": true }))
    }

    fn module_id(&self) -> &str {
        MODULE_ID
    }
}

/// Filter for alterCombatTarget: nobody attacks themselves.
fn refuse_self_attack(value: &HookValue) -> Result<HookValue, AppError> {
    let mut payload = HookPayload::from_value(value.clone())?;

    if payload.get_i64("attacker_id").is_some()
        && payload.get_i64("attacker_id") == payload.get_i64("target_id")
    {
        payload.set("allowed", Value::Bool(false));
        payload.set("reason", json!("You cannot attack yourself"));
    }

    Ok(payload.into_value())
}

/// The combat module.
#[derive(Debug)]
pub struct CombatModule {
    log: Arc<ActivityLog>,
}

impl CombatModule {
    /// Create the module.
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl GameModule for CombatModule {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: MODULE_ID.to_string(),
            name: "Combat".to_string(),
            version: "1.0.0".to_string(),
            description: "Player versus player attacks".to_string(),
            load_order: 10,
        }
    }

    fn exports(&self) -> ModuleExport {
        ModuleExport::new(MODULE_ID)
            .on(
                names::AFTER_COMBAT,
                10,
                Arc::new(AfterCombatHook::new(self.log.clone())),
            )
            .on_fn(names::ALTER_COMBAT_TARGET, 10, refuse_self_attack)
            .on_fn(names::CUSTOM_MENUS, 10, |_| {
                Ok(json!([{ "module": MODULE_ID, "label": "Attack", "route": "/combat" }]))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refuse_self_attack() {
        let out = refuse_self_attack(&json!({"attacker_id": 3, "target_id": 3, "allowed": true}))
            .unwrap();
        assert_eq!(out["allowed"], json!(false));

        let out = refuse_self_attack(&json!({"attacker_id": 3, "target_id": 4, "allowed": true}))
            .unwrap();
        assert_eq!(out["allowed"], json!(true));
        assert!(out.get("reason").is_none());
    }

    #[tokio::test]
    async fn test_after_combat_requires_ids() {
        let log = Arc::new(ActivityLog::new());
        let hook = AfterCombatHook::new(log.clone());

        assert!(hook.handle(&json!({"winner_id": 1})).await.is_err());

        let out = hook
            .handle(&json!({"winner_id": 1, "loser_id": 2}))
            .await
            .unwrap();
        assert_eq!(out, json!({"module": "combat", "logged": true}));
        assert_eq!(log.messages_for(MODULE_ID).await, vec!["user 1 beat user 2"]);
    }
}
