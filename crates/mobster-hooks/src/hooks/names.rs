//! Well-known hook names used by the game flow.
//!
//! The registry accepts any non-empty string as a hook name; these
//! constants only keep call sites and modules from drifting apart on
//! spelling. Each constant documents the payload shape its call site
//! sends and what subscribers are expected to return.

// ── Combat ──

/// Fired before an attack is resolved. Payload: `{attacker_id, target_id}`.
pub const BEFORE_COMBAT: &str = "beforeCombat";
/// Fired after an attack is resolved. Payload: `{attacker_id, target_id, winner_id, loser_id}`.
/// Collect mode; each subscriber returns a summary object.
pub const AFTER_COMBAT: &str = "afterCombat";
/// Filter over the chosen target. Payload: `{attacker_id, target_id, allowed, ...}`.
pub const ALTER_COMBAT_TARGET: &str = "alterCombatTarget";

// ── Bank ──

/// Filter over a deposit before it is applied. Payload: `{user_id, amount}`.
pub const BEFORE_BANK_DEPOSIT: &str = "beforeBankDeposit";
/// Action fired after a deposit is applied. Payload: `{user_id, amount, fee}`.
pub const AFTER_BANK_DEPOSIT: &str = "afterBankDeposit";

// ── Drugs ──

/// Filter over a drug quote. Payload: `{drug, location, price}`.
pub const ALTER_DRUG_PRICE: &str = "alterDrugPrice";
/// Action fired after a sale. Payload: `{user_id, drug, quantity, price}`.
pub const AFTER_DRUG_SALE: &str = "afterDrugSale";

// ── Jail ──

/// Single mode; the last subscriber decides the bail. Payload: `{user_id, minutes_left}`.
pub const BEFORE_JAIL_RELEASE: &str = "beforeJailRelease";
/// Action fired once an inmate is released. Payload: `{user_id}`.
pub const AFTER_JAIL_RELEASE: &str = "afterJailRelease";

// ── Presentation ──

/// Collect mode; each subscriber returns a list of menu entries.
pub const CUSTOM_MENUS: &str = "customMenus";

// ── Lifecycle ──

/// Action fired by the module manager after a module is registered. Payload: `{module_id}`.
pub const MODULE_LOADED: &str = "moduleLoaded";

/// Every well-known hook name.
pub const ALL: &[&str] = &[
    BEFORE_COMBAT,
    AFTER_COMBAT,
    ALTER_COMBAT_TARGET,
    BEFORE_BANK_DEPOSIT,
    AFTER_BANK_DEPOSIT,
    ALTER_DRUG_PRICE,
    AFTER_DRUG_SALE,
    BEFORE_JAIL_RELEASE,
    AFTER_JAIL_RELEASE,
    CUSTOM_MENUS,
    MODULE_LOADED,
];

/// Returns whether a name is one of the well-known hooks.
pub fn is_known(name: &str) -> bool {
    ALL.contains(&name)
}
