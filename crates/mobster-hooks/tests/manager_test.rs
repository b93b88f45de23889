//! Module bootstrap behaviour.

use std::sync::Arc;

use serde_json::{Value, json};

use mobster_core::config::ModulesConfig;
use mobster_core::error::{AppError, ErrorKind};
use mobster_hooks::hooks::names;
use mobster_hooks::prelude::*;
use mobster_hooks::ModuleManager;

#[derive(Debug)]
struct TestModule {
    id: &'static str,
    load_order: i32,
    fail_on_load: bool,
}

impl TestModule {
    fn new(id: &'static str, load_order: i32) -> Self {
        Self {
            id,
            load_order,
            fail_on_load: false,
        }
    }
}

#[async_trait]
impl GameModule for TestModule {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: self.id.to_string(),
            name: self.id.to_uppercase(),
            version: "1.0.0".to_string(),
            description: "test module".to_string(),
            load_order: self.load_order,
        }
    }

    async fn on_load(&self) -> Result<(), AppError> {
        if self.fail_on_load {
            return Err(AppError::internal("missing table"));
        }
        Ok(())
    }

    fn exports(&self) -> ModuleExport {
        let id = self.id;
        ModuleExport::new(self.id).on_fn("greet", DEFAULT_PRIORITY, move |_| Ok(json!(id)))
    }
}

fn modules() -> Vec<Arc<dyn GameModule>> {
    vec![
        Arc::new(TestModule::new("casino", 20)),
        Arc::new(TestModule::new("bank", 10)),
        Arc::new(TestModule::new("jail", 10)),
    ]
}

#[tokio::test]
async fn test_bootstrap_follows_load_order() {
    let manager = ModuleManager::new();
    let report = manager
        .bootstrap(modules(), &ModulesConfig::default())
        .await
        .unwrap();

    assert_eq!(report.loaded, vec!["bank", "jail", "casino"]);
    assert!(report.skipped.is_empty());
    assert_eq!(report.subscribers, 3);

    let results = manager.dispatcher().run("greet", &Value::Null).await.unwrap();
    assert_eq!(results, vec![json!("bank"), json!("jail"), json!("casino")]);
}

#[tokio::test]
async fn test_bootstrap_skips_disabled_modules() {
    let mut config = ModulesConfig::default();
    config.set_enabled("jail", false);

    let manager = ModuleManager::new();
    let report = manager.bootstrap(modules(), &config).await.unwrap();

    assert_eq!(report.loaded, vec!["bank", "casino"]);
    assert_eq!(report.skipped, vec!["jail"]);
    assert!(!manager.module_registry().contains("jail").await);
}

#[tokio::test]
async fn test_priority_offset_reorders_modules() {
    let mut config = ModulesConfig::default();
    config.modules.entry("casino".to_string()).or_default().priority_offset = -5;

    let manager = ModuleManager::new();
    manager.bootstrap(modules(), &config).await.unwrap();

    let results = manager.dispatcher().run("greet", &Value::Null).await.unwrap();
    assert_eq!(results, vec![json!("casino"), json!("bank"), json!("jail")]);
}

#[tokio::test]
async fn test_second_bootstrap_rejects_duplicate_module() {
    let manager = ModuleManager::new();
    manager
        .bootstrap(vec![Arc::new(TestModule::new("bank", 10))], &ModulesConfig::default())
        .await
        .unwrap();

    let err = manager
        .bootstrap(vec![Arc::new(TestModule::new("bank", 10))], &ModulesConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(manager.hook_registry().count("greet").await, 1);
}

#[tokio::test]
async fn test_direct_reregistration_duplicates_subscribers() {
    let manager = ModuleManager::new();
    let module = TestModule::new("bank", 10);

    for _ in 0..2 {
        for hook in module.exports().hooks {
            manager
                .hook_registry()
                .subscribe(&hook.subscription, hook.handler)
                .await
                .unwrap();
        }
    }

    assert_eq!(manager.hook_registry().count("greet").await, 2);
}

#[tokio::test]
async fn test_failed_on_load_aborts_bootstrap() {
    let broken = TestModule {
        fail_on_load: true,
        ..TestModule::new("drugs", 0)
    };

    let manager = ModuleManager::new();
    let err = manager
        .bootstrap(
            vec![Arc::new(broken), Arc::new(TestModule::new("bank", 10))],
            &ModulesConfig::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Module);
    assert!(err.message.contains("missing table"));
    assert!(!manager.hook_registry().has("greet").await);
}

#[tokio::test]
async fn test_module_loaded_is_announced() {
    let registry = Arc::new(HookRegistry::new());
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    registry
        .register_fn(names::MODULE_LOADED, "watcher", 10, move |p| {
            sink.lock().unwrap().push(p["module_id"].as_str().unwrap_or_default().to_string());
            Ok(Value::Null)
        })
        .await
        .unwrap();

    let manager = ModuleManager::with_registry(registry);
    manager
        .bootstrap(modules(), &ModulesConfig::default())
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["bank", "jail", "casino"]);
}

#[tokio::test]
async fn test_unload_module_removes_subscribers() {
    let manager = ModuleManager::new();
    manager
        .bootstrap(modules(), &ModulesConfig::default())
        .await
        .unwrap();

    assert_eq!(manager.unload_module("jail").await.unwrap(), 1);
    assert_eq!(manager.hook_registry().count("greet").await, 2);
    assert_eq!(
        manager.unload_module("jail").await.unwrap_err().kind,
        ErrorKind::NotFound
    );

    manager.unload_all().await;
    assert!(manager.list_modules().await.is_empty());
    assert!(manager.hook_registry().hook_names().await.is_empty());
}

#[derive(Debug)]
struct ExportModule {
    id: &'static str,
    build: fn() -> ModuleExport,
}

#[async_trait]
impl GameModule for ExportModule {
    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: self.id.to_string(),
            name: self.id.to_uppercase(),
            version: "1.0.0".to_string(),
            description: "test module".to_string(),
            load_order: 0,
        }
    }

    fn exports(&self) -> ModuleExport {
        (self.build)()
    }
}

#[tokio::test]
async fn test_failed_registration_rolls_back_module() {
    let gangs = ExportModule {
        id: "gangs",
        build: || {
            ModuleExport::new("gangs")
                .on_fn("greet", DEFAULT_PRIORITY, |_| Ok(json!("gangs")))
                .on_fn("greet", 20, |_| Ok(json!("gangs late")))
                .on_fn("", DEFAULT_PRIORITY, |_| Ok(Value::Null))
        },
    };

    let manager = ModuleManager::new();
    let err = manager
        .bootstrap(vec![Arc::new(gangs)], &ModulesConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Module);
    let cause = err
        .source
        .as_ref()
        .and_then(|e| e.downcast_ref::<AppError>())
        .map(|e| e.kind);
    assert_eq!(cause, Some(ErrorKind::Validation));
    assert!(!manager.module_registry().contains("gangs").await);
    assert!(!manager.hook_registry().has("greet").await);
    assert!(manager.hook_registry().hook_names().await.is_empty());
}

#[tokio::test]
async fn test_export_with_foreign_subscriber_is_rejected() {
    let gangs = ExportModule {
        id: "gangs",
        build: || {
            let helper = Arc::new(FnHandler::new("shared-helper", |_| Ok(json!("still here"))));
            ModuleExport::new("gangs")
                .on("greet", DEFAULT_PRIORITY, helper)
                .on_fn("greet", DEFAULT_PRIORITY, |_| Ok(json!("gangs")))
        },
    };

    let manager = ModuleManager::new();
    let err = manager
        .bootstrap(vec![Arc::new(gangs)], &ModulesConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Module);
    assert!(err.message.contains("shared-helper"));
    assert!(!manager.module_registry().contains("gangs").await);

    let results = manager.dispatcher().run("greet", &Value::Null).await.unwrap();
    assert!(results.is_empty());
}
