//! Jail module — locks up attackers caught in the act and prices bail.
//!
//! Inmates are tracked in memory as user id → minutes left. Persistence of
//! sentences is the game's storage layer's concern, not this module's.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::info;

use mobster_core::config::ModulesConfig;
use mobster_core::error::AppError;
use mobster_hooks::hooks::names;
use mobster_hooks::prelude::*;

use crate::activity::ActivityLog;

/// Module id.
pub const MODULE_ID: &str = "jail";

const DEFAULT_SENTENCE_MINUTES: i64 = 10;
const DEFAULT_BAIL_PER_MINUTE: i64 = 100;

/// Current inmates.
#[derive(Debug, Default)]
pub struct Inmates {
    sentences: RwLock<HashMap<i64, i64>>,
}

impl Inmates {
    /// Jails a user, extending any sentence already running.
    pub async fn jail(&self, user_id: i64, minutes: i64) -> i64 {
        let mut sentences = self.sentences.write().await;
        let left = sentences.entry(user_id).or_insert(0);
        *left = left.saturating_add(minutes);
        *left
    }

    /// Releases a user. Returns whether they were jailed.
    pub async fn release(&self, user_id: i64) -> bool {
        self.sentences.write().await.remove(&user_id).is_some()
    }

    /// Minutes left for a user, if jailed.
    pub async fn minutes_left(&self, user_id: i64) -> Option<i64> {
        self.sentences.read().await.get(&user_id).copied()
    }

    /// Returns whether a user is jailed.
    pub async fn is_jailed(&self, user_id: i64) -> bool {
        self.sentences.read().await.contains_key(&user_id)
    }
}

/// afterCombat: jail a witnessed attacker.
#[derive(Debug)]
struct AfterCombatHook {
    inmates: Arc<Inmates>,
    log: Arc<ActivityLog>,
    sentence_minutes: i64,
}

#[async_trait]
impl HookHandler for AfterCombatHook {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        let payload = HookPayload::from_value(payload.clone())?;
        let attacker = payload.require_i64("attacker_id")?;

        if !payload.get_bool("witnessed").unwrap_or(false) {
            return Ok(json!({ "module": MODULE_ID, "jailed": false }));
        }

        let left = self.inmates.jail(attacker, self.sentence_minutes).await;
        self.log
            .record(
                MODULE_ID,
                names::AFTER_COMBAT,
                format!("user {attacker} jailed for {left} minutes"),
            )
            .await;

        Ok(json!({ "module": MODULE_ID, "jailed": true, "minutes": left }))
    }

    fn module_id(&self) -> &str {
        MODULE_ID
    }
}

/// alterCombatTarget: inmates cannot be attacked.
#[derive(Debug)]
struct ProtectInmatesHook {
    inmates: Arc<Inmates>,
}

#[async_trait]
impl HookHandler for ProtectInmatesHook {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        let mut payload = HookPayload::from_value(payload.clone())?;
        let target = payload.require_i64("target_id")?;

        if self.inmates.is_jailed(target).await {
            payload.set("allowed", Value::Bool(false));
            payload.set("reason", json!("Target is in jail"));
        }

        Ok(payload.into_value())
    }

    fn module_id(&self) -> &str {
        MODULE_ID
    }
}

/// beforeJailRelease: quote the bail for the remaining sentence.
#[derive(Debug)]
struct BailQuoteHook {
    inmates: Arc<Inmates>,
    bail_per_minute: i64,
}

#[async_trait]
impl HookHandler for BailQuoteHook {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        let payload = HookPayload::from_value(payload.clone())?;
        let user = payload.require_i64("user_id")?;

        let minutes = match self.inmates.minutes_left(user).await {
            Some(m) => m,
            None => return Ok(json!({ "jailed": false, "bail": 0 })),
        };

        Ok(json!({ "jailed": true, "bail": minutes.saturating_mul(self.bail_per_minute) }))
    }

    fn module_id(&self) -> &str {
        MODULE_ID
    }
}

/// afterJailRelease: drop the inmate.
#[derive(Debug)]
struct ReleaseHook {
    inmates: Arc<Inmates>,
    log: Arc<ActivityLog>,
}

#[async_trait]
impl HookHandler for ReleaseHook {
    async fn handle(&self, payload: &HookValue) -> Result<HookValue, AppError> {
        let payload = HookPayload::from_value(payload.clone())?;
        let user = payload.require_i64("user_id")?;

        if self.inmates.release(user).await {
            info!(user_id = user, "Inmate released");
            self.log
                .record(MODULE_ID, names::AFTER_JAIL_RELEASE, format!("user {user} released"))
                .await;
        }

        Ok(Value::Null)
    }

    fn module_id(&self) -> &str {
        MODULE_ID
    }
}

/// The jail module.
#[derive(Debug)]
pub struct JailModule {
    inmates: Arc<Inmates>,
    log: Arc<ActivityLog>,
    sentence_minutes: i64,
    bail_per_minute: i64,
}

impl JailModule {
    /// Create the module with default sentence and bail settings.
    pub fn new(log: Arc<ActivityLog>) -> Self {
        Self {
            inmates: Arc::new(Inmates::default()),
            log,
            sentence_minutes: DEFAULT_SENTENCE_MINUTES,
            bail_per_minute: DEFAULT_BAIL_PER_MINUTE,
        }
    }

    /// Create the module reading `sentence_minutes` and `bail_per_minute`
    /// from its config section.
    pub fn from_config(config: &ModulesConfig, log: Arc<ActivityLog>) -> Self {
        let mut module = Self::new(log);
        if let Some(minutes) = config.setting_i64(MODULE_ID, "sentence_minutes") {
            module.sentence_minutes = minutes.max(1);
        }
        if let Some(bail) = config.setting_i64(MODULE_ID, "bail_per_minute") {
            module.bail_per_minute = bail.max(0);
        }
        module
    }

    /// The module's inmate table.
    pub fn inmates(&self) -> &Arc<Inmates> {
        &self.inmates
    }
}

#[async_trait]
impl GameModule for JailModule {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: MODULE_ID.to_string(),
            name: "Jail".to_string(),
            version: "1.0.0".to_string(),
            description: "Sentences, protection and bail".to_string(),
            load_order: 20,
        }
    }

    fn exports(&self) -> ModuleExport {
        ModuleExport::new(MODULE_ID)
            .on(
                names::AFTER_COMBAT,
                5,
                Arc::new(AfterCombatHook {
                    inmates: self.inmates.clone(),
                    log: self.log.clone(),
                    sentence_minutes: self.sentence_minutes,
                }),
            )
            .on(
                names::ALTER_COMBAT_TARGET,
                5,
                Arc::new(ProtectInmatesHook {
                    inmates: self.inmates.clone(),
                }),
            )
            .on(
                names::BEFORE_JAIL_RELEASE,
                DEFAULT_PRIORITY,
                Arc::new(BailQuoteHook {
                    inmates: self.inmates.clone(),
                    bail_per_minute: self.bail_per_minute,
                }),
            )
            .on(
                names::AFTER_JAIL_RELEASE,
                DEFAULT_PRIORITY,
                Arc::new(ReleaseHook {
                    inmates: self.inmates.clone(),
                    log: self.log.clone(),
                }),
            )
            .on_fn(names::CUSTOM_MENUS, 20, |_| {
                Ok(json!([{ "module": MODULE_ID, "label": "Jail", "route": "/jail" }]))
            })
    }
}
