//! Built-in modules bootstrapped together and driven through the typed flows.

use std::sync::Arc;

use serde_json::json;

use mobster_core::config::{AppConfig, ModulesConfig};
use mobster_core::error::{AppError, ErrorKind};
use mobster_hooks::hooks::names;
use mobster_hooks::ModuleManager;
use mobster_modules::flows::{self, CombatOutcome, Deposit};
use mobster_modules::{ActivityLog, default_modules};

async fn boot(config: &ModulesConfig) -> (ModuleManager, Arc<ActivityLog>) {
    let log = Arc::new(ActivityLog::new());
    let manager = ModuleManager::new();
    manager
        .bootstrap(default_modules(config, log.clone()), config)
        .await
        .unwrap();
    (manager, log)
}

fn witnessed_fight() -> CombatOutcome {
    CombatOutcome {
        attacker_id: 1,
        target_id: 2,
        winner_id: 1,
        loser_id: 2,
        witnessed: true,
    }
}

#[tokio::test]
async fn test_bootstrap_registers_every_module() {
    let config = ModulesConfig::default();
    let log = Arc::new(ActivityLog::new());
    let manager = ModuleManager::new();
    let report = manager
        .bootstrap(default_modules(&config, log), &config)
        .await
        .unwrap();

    assert_eq!(report.loaded, vec!["combat", "jail", "bank", "drugs"]);
    assert_eq!(report.subscribers, 13);

    let info = manager.hook_registry().debug_info().await;
    assert_eq!(info.hooks[names::AFTER_COMBAT].priorities(), vec![5, 10]);
    assert_eq!(info.hooks[names::CUSTOM_MENUS].count, 3);
}

#[tokio::test]
async fn test_after_combat_runs_jail_before_combat() {
    let (manager, log) = boot(&ModulesConfig::default()).await;

    let results = flows::finish_combat(manager.dispatcher(), &witnessed_fight())
        .await
        .unwrap();

    assert_eq!(
        results,
        vec![
            json!({"module": "jail", "jailed": true, "minutes": 10}),
            json!({"module": "combat", "logged": true}),
        ]
    );
    assert_eq!(log.messages_for("jail").await, vec!["user 1 jailed for 10 minutes"]);
    assert_eq!(log.messages_for("combat").await, vec!["user 1 beat user 2"]);
}

#[tokio::test]
async fn test_inmates_cannot_be_targeted() {
    let (manager, _) = boot(&ModulesConfig::default()).await;
    let d = manager.dispatcher();

    assert!(flows::check_target(d, 2, 1).await.unwrap().allowed);

    flows::finish_combat(d, &witnessed_fight()).await.unwrap();

    let decision = flows::check_target(d, 2, 1).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("Target is in jail"));

    let decision = flows::check_target(d, 3, 3).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason.as_deref(), Some("You cannot attack yourself"));
}

#[tokio::test]
async fn test_bail_and_release() {
    let (manager, log) = boot(&ModulesConfig::default()).await;
    let d = manager.dispatcher();

    assert_eq!(flows::bail_quote(d, 1).await.unwrap(), 0);

    flows::finish_combat(d, &witnessed_fight()).await.unwrap();
    assert_eq!(flows::bail_quote(d, 1).await.unwrap(), 1_000);

    flows::release_from_jail(d, 1).await.unwrap();
    assert_eq!(flows::bail_quote(d, 1).await.unwrap(), 0);
    assert!(log.messages_for("jail").await.contains(&"user 1 released".to_string()));
}

#[tokio::test]
async fn test_deposit_charges_fee_and_records() {
    let (manager, log) = boot(&ModulesConfig::default()).await;

    let deposit = flows::deposit(manager.dispatcher(), 7, 1_000).await.unwrap();

    assert_eq!(deposit, Deposit { amount: 980, fee: 20 });
    assert_eq!(
        log.messages_for("bank").await,
        vec!["user 7 deposited $980 (fee $20)"]
    );
}

#[tokio::test]
async fn test_rejected_deposit_is_not_announced() {
    let (manager, log) = boot(&ModulesConfig::default()).await;

    let err = flows::deposit(manager.dispatcher(), 7, 0).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Hook);
    assert!(err.message.contains("'bank'"));
    assert!(log.messages_for("bank").await.is_empty());
}

#[tokio::test]
async fn test_extra_filter_runs_after_bank_fee() {
    let (manager, _) = boot(&ModulesConfig::default()).await;
    let registry = manager.hook_registry();
    registry
        .register_fn(names::BEFORE_BANK_DEPOSIT, "vip", 50, |v| {
            let mut out = v.clone();
            out["fee"] = json!(0);
            Ok(out)
        })
        .await
        .unwrap();

    let deposit = flows::deposit(manager.dispatcher(), 7, 1_000).await.unwrap();
    assert_eq!(deposit, Deposit { amount: 980, fee: 0 });
}

#[tokio::test]
async fn test_drug_markup_from_config() {
    let config = AppConfig::from_toml(
        r#"
        [modules.modules.drugs]
        markup_percent = 50
        "#,
    )
    .unwrap();
    let (manager, log) = boot(&config.modules).await;
    let d = manager.dispatcher();

    assert_eq!(
        flows::quote_drug_price(d, "cocaine", "Chicago", 200).await.unwrap(),
        300
    );

    let failures = flows::record_drug_sale(d, 4, "cocaine", 3, 300).await;
    assert!(failures.is_empty());
    assert_eq!(log.messages_for("drugs").await, vec!["user 4 sold 3 x cocaine"]);
}

#[tokio::test]
async fn test_failing_sale_listener_is_isolated() {
    let (manager, log) = boot(&ModulesConfig::default()).await;
    manager
        .hook_registry()
        .register_fn(names::AFTER_DRUG_SALE, "audit", 1, |_| {
            Err(AppError::internal("audit sink offline"))
        })
        .await
        .unwrap();

    let failures = flows::record_drug_sale(manager.dispatcher(), 4, "weed", 1, 50).await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].module_id, "audit");
    assert_eq!(log.messages_for("drugs").await, vec!["user 4 sold 1 x weed"]);
}

#[tokio::test]
async fn test_menus_in_priority_order_skipping_malformed() {
    let (manager, _) = boot(&ModulesConfig::default()).await;
    manager
        .hook_registry()
        .register_fn(names::CUSTOM_MENUS, "broken", 15, |_| Ok(json!("not a list")))
        .await
        .unwrap();

    let labels: Vec<String> = flows::custom_menus(manager.dispatcher())
        .await
        .into_iter()
        .map(|m| m.label)
        .collect();

    assert_eq!(labels, vec!["Attack", "Jail", "Bank"]);
}

#[tokio::test]
async fn test_disabled_jail_leaves_combat_alone() {
    let mut config = ModulesConfig::default();
    config.set_enabled("jail", false);
    let (manager, _) = boot(&config).await;
    let d = manager.dispatcher();

    let results = flows::finish_combat(d, &witnessed_fight()).await.unwrap();
    assert_eq!(results, vec![json!({"module": "combat", "logged": true})]);
    assert!(flows::check_target(d, 2, 1).await.unwrap().allowed);
    assert!(!manager.hook_registry().has(names::BEFORE_JAIL_RELEASE).await);
}
