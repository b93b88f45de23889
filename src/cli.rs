//! CLI command definitions and dispatch.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use mobster_core::config::AppConfig;
use mobster_core::error::AppError;
use mobster_hooks::hooks::names;
use mobster_hooks::{ErrorPolicy, HookFailure, ModuleManager};
use mobster_modules::{ActivityLog, default_modules};

use crate::output::{self, OutputFormat};

/// Mobster — game hook bus tooling
#[derive(Debug, Parser)]
#[command(name = "mobster", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (loads config/<env>.toml over config/default.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List hook names with their subscribers
    Hooks,
    /// Print the full registry debug info as JSON
    Debug,
    /// List loaded and skipped modules
    Modules,
    /// Fire a hook with a JSON payload
    Fire(FireArgs),
}

/// Arguments for `fire`
#[derive(Debug, Args)]
pub struct FireArgs {
    /// Hook name
    pub hook: String,

    /// JSON payload (defaults to null)
    #[arg(short, long)]
    pub payload: Option<String>,

    /// Dispatch mode
    #[arg(short, long, value_enum, default_value = "run")]
    pub mode: FireMode,

    /// Log and skip failing subscribers instead of aborting
    #[arg(long)]
    pub isolated: bool,
}

/// How `fire` dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FireMode {
    /// Collect every subscriber's result
    Run,
    /// Keep only the last subscriber's result
    Single,
    /// Pipe the payload through every subscriber
    Filter,
    /// Run for side effects only
    Action,
}

/// One row of the `hooks` table
#[derive(Debug, Serialize, Tabled)]
struct HookRow {
    /// Hook name
    hook: String,
    /// Subscriber count
    subscribers: usize,
    /// Priorities in execution order
    priorities: String,
    /// Modules in execution order
    modules: String,
    /// Whether the name is a well-known hook
    known: bool,
}

/// One row of the `modules` table
#[derive(Debug, Serialize, Tabled)]
struct ModuleRow {
    /// Module id
    id: String,
    /// Display name
    name: String,
    /// Version
    version: String,
    /// Load order
    load_order: i32,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let log = Arc::new(ActivityLog::new());
        let manager = ModuleManager::new();
        let report = manager
            .bootstrap(default_modules(&config.modules, log.clone()), &config.modules)
            .await?;

        match &self.command {
            Commands::Hooks => {
                let info = manager.hook_registry().debug_info().await;
                let rows: Vec<HookRow> = info
                    .hooks
                    .iter()
                    .map(|(hook, summary)| HookRow {
                        hook: hook.clone(),
                        subscribers: summary.count,
                        priorities: join(summary.priorities()),
                        modules: join(summary.subscribers.iter().map(|s| s.module_id.clone())),
                        known: names::is_known(hook),
                    })
                    .collect();
                output::print_list(&rows, self.format);
            }
            Commands::Debug => {
                output::print_json(&manager.hook_registry().debug_info().await);
            }
            Commands::Modules => {
                let rows: Vec<ModuleRow> = manager
                    .list_modules()
                    .await
                    .into_iter()
                    .map(|m| ModuleRow {
                        id: m.id,
                        name: m.name,
                        version: m.version,
                        load_order: m.load_order,
                    })
                    .collect();
                output::print_list(&rows, self.format);
                for skipped in &report.skipped {
                    output::print_warning(&format!("Module '{skipped}' is disabled"));
                }
            }
            Commands::Fire(args) => {
                fire(&manager, args).await?;
                let activity = log.entries().await;
                if !activity.is_empty() {
                    output::print_json(&activity);
                }
            }
        }

        Ok(())
    }
}

async fn fire(manager: &ModuleManager, args: &FireArgs) -> Result<(), AppError> {
    let payload: Value = match &args.payload {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("Payload is not valid JSON: {e}")))?,
        None => Value::Null,
    };

    let dispatcher = manager.dispatcher();
    let policy = if args.isolated {
        ErrorPolicy::Isolated
    } else {
        ErrorPolicy::Strict
    };

    if !manager.hook_registry().has(&args.hook).await {
        tracing::warn!(hook = %args.hook, "No subscribers registered for hook");
    }

    let (value, failures) = match args.mode {
        FireMode::Filter => {
            let report = dispatcher.pipe(&args.hook, payload, policy).await?;
            (report.value, report.failures)
        }
        mode => {
            let report = dispatcher.dispatch(&args.hook, &payload, policy).await?;
            let value = match mode {
                FireMode::Single => report.last_or_null(),
                FireMode::Action => Value::Null,
                _ => Value::Array(report.results),
            };
            (value, report.failures)
        }
    };

    output::print_json(&value);
    print_failures(&failures);

    Ok(())
}

fn print_failures(failures: &[HookFailure]) {
    for failure in failures {
        output::print_warning(&format!(
            "Subscriber '{}' (priority {}) failed: {}",
            failure.module_id, failure.priority, failure.error
        ));
    }
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
