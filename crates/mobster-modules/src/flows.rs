//! Typed game-flow call sites.
//!
//! Hook payloads are plain JSON; these functions pin down the shape each
//! extension point is fired with and validate what comes back, so the rest
//! of the game never builds hook payloads by hand.
//!
//! Each call site picks its own error policy: state-changing flows are
//! strict, side-channel notifications and display assembly are isolated.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use mobster_core::error::AppError;
use mobster_hooks::hooks::names;
use mobster_hooks::{HookDispatcher, HookFailure, HookPayload, HookValue};

/// Whether an attack may go ahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDecision {
    /// Whether the attack is allowed.
    pub allowed: bool,
    /// Why not, if refused.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Result of a resolved fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Who attacked.
    pub attacker_id: i64,
    /// Who was attacked.
    pub target_id: i64,
    /// Who won.
    pub winner_id: i64,
    /// Who lost.
    pub loser_id: i64,
    /// Whether the police saw it.
    #[serde(default)]
    pub witnessed: bool,
}

/// A deposit after fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Amount credited.
    pub amount: i64,
    /// Total fee charged.
    pub fee: i64,
}

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Contributing module.
    pub module: String,
    /// Label shown to the player.
    pub label: String,
    /// Route the entry links to.
    pub route: String,
}

/// Asks every module whether `attacker_id` may attack `target_id`.
pub async fn check_target(
    dispatcher: &HookDispatcher,
    attacker_id: i64,
    target_id: i64,
) -> Result<TargetDecision, AppError> {
    let payload = HookPayload::new()
        .with_int("attacker_id", attacker_id)
        .with_int("target_id", target_id)
        .with_bool("allowed", true);

    let value = dispatcher
        .filter(names::ALTER_COMBAT_TARGET, payload.into_value())
        .await?;

    Ok(serde_json::from_value(value)?)
}

/// Announces a resolved fight. Returns each module's summary, in order.
pub async fn finish_combat(
    dispatcher: &HookDispatcher,
    outcome: &CombatOutcome,
) -> Result<Vec<HookValue>, AppError> {
    let payload = serde_json::to_value(outcome)?;
    dispatcher.run(names::AFTER_COMBAT, &payload).await
}

/// Runs a deposit through the fee filters and announces it.
pub async fn deposit(
    dispatcher: &HookDispatcher,
    user_id: i64,
    amount: i64,
) -> Result<Deposit, AppError> {
    let payload = HookPayload::new()
        .with_int("user_id", user_id)
        .with_int("amount", amount)
        .with_int("fee", 0);

    let filtered = HookPayload::from_value(
        dispatcher
            .filter(names::BEFORE_BANK_DEPOSIT, payload.into_value())
            .await?,
    )?;

    let deposit = Deposit {
        amount: filtered.require_i64("amount")?,
        fee: filtered.require_i64("fee")?,
    };

    if deposit.amount < 0 {
        return Err(AppError::validation(format!(
            "Deposit filters produced a negative amount ({})",
            deposit.amount
        )));
    }

    let announced = json!({ "user_id": user_id, "amount": deposit.amount, "fee": deposit.fee });
    dispatcher.action(names::AFTER_BANK_DEPOSIT, &announced).await?;

    Ok(deposit)
}

/// Quotes a drug price after every module has adjusted it.
pub async fn quote_drug_price(
    dispatcher: &HookDispatcher,
    drug: &str,
    location: &str,
    base_price: i64,
) -> Result<i64, AppError> {
    let payload = HookPayload::new()
        .with_string("drug", drug)
        .with_string("location", location)
        .with_int("price", base_price);

    let quoted = HookPayload::from_value(
        dispatcher
            .filter(names::ALTER_DRUG_PRICE, payload.into_value())
            .await?,
    )?;

    quoted.require_i64("price")
}

/// Announces a completed sale. Listener failures never undo the sale.
pub async fn record_drug_sale(
    dispatcher: &HookDispatcher,
    user_id: i64,
    drug: &str,
    quantity: i64,
    price: i64,
) -> Vec<HookFailure> {
    let payload = json!({
        "user_id": user_id,
        "drug": drug,
        "quantity": quantity,
        "price": price,
    });

    dispatcher.action_isolated(names::AFTER_DRUG_SALE, &payload).await
}

/// Asks for the bail of a jailed user. The last subscriber decides; 0 if none.
pub async fn bail_quote(dispatcher: &HookDispatcher, user_id: i64) -> Result<i64, AppError> {
    let answer = dispatcher
        .run_single(names::BEFORE_JAIL_RELEASE, &json!({ "user_id": user_id }))
        .await?;

    match answer {
        Value::Null => Ok(0),
        other => HookPayload::from_value(other)?.require_i64("bail"),
    }
}

/// Announces a release from jail.
pub async fn release_from_jail(dispatcher: &HookDispatcher, user_id: i64) -> Result<(), AppError> {
    dispatcher
        .action(names::AFTER_JAIL_RELEASE, &json!({ "user_id": user_id }))
        .await
}

/// Collects menu entries from every module.
///
/// Failing modules and malformed entries are logged and left out.
pub async fn custom_menus(dispatcher: &HookDispatcher) -> Vec<MenuEntry> {
    let report = dispatcher.run_isolated(names::CUSTOM_MENUS, &Value::Null).await;

    let mut entries = Vec::new();
    for value in report.results {
        match serde_json::from_value::<Vec<MenuEntry>>(value) {
            Ok(mut contributed) => entries.append(&mut contributed),
            Err(e) => warn!(error = %e, "Ignoring malformed menu contribution"),
        }
    }
    entries
}
