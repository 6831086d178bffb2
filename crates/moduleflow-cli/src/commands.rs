//! Command handlers for the moduleflow CLI

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use moduleflow_core::{AttachLifecycleOption, State};
use moduleflow_runtime::{
    register, App, AppBuilder, ComponentProps, LogFlushTask, MemoryHistory,
};
use serde::Serialize;
use serde_json::json;

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::Result;
use crate::modules::{CartModule, ClockModule, ADD_ITEM, CHECKOUT};
use crate::transport::{ConsoleErrorListener, StdoutTransport};

/// Inputs of one demo run
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub seconds: u64,
    pub items: Vec<String>,
    pub fail_checkout: bool,
}

/// What the demo leaves behind
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoReport {
    pub state: State,
    pub pending_log_events: usize,
    pub navigation_prompt: Option<String>,
}

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        match cli.command {
            Commands::Demo {
                seconds,
                items,
                fail_checkout,
            } => {
                let options = DemoOptions {
                    seconds,
                    items,
                    fail_checkout,
                };
                let report = run_demo(&config, options).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(())
            }
            Commands::Actions => {
                for action in list_actions(&config)? {
                    println!("{}", action);
                }
                Ok(())
            }
            Commands::Config => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        }
    }
}

fn build_app(config: &AppConfig) -> AppBuilder {
    AppBuilder::new()
        .with_config(config.framework.clone())
        .with_history(Arc::new(MemoryHistory::new(&config.initial_url)))
        .with_error_listener(Arc::new(ConsoleErrorListener))
        .with_log_transport(Arc::new(StdoutTransport {
            print_batches: config.print_log_batches,
        }))
}

/// Qualified action names of the sample modules
pub fn list_actions(config: &AppConfig) -> Result<Vec<String>> {
    let app = build_app(config).build()?;
    register(&app, CartModule)?;
    register(&app, ClockModule)?;
    Ok(app.registry().action_names())
}

/// Boot an app, fill and check out a cart while a clock component ticks,
/// then unmount and report the final state.
pub async fn run_demo(config: &AppConfig, options: DemoOptions) -> Result<DemoReport> {
    let mut handle = build_app(config).build_and_start().await?;
    let app = handle.app().clone();

    let cart = register(&app, CartModule)?;
    let clock = register(&app, ClockModule)?;

    let mut component = clock
        .attach_lifecycle(AttachLifecycleOption {
            retain_state_on_leave: true,
        })
        .mount(ComponentProps::unrouted());

    for item in options.items {
        cart.dispatch(ADD_ITEM, (item,))?;
    }
    cart.dispatch(
        CHECKOUT,
        (json!({"card": "4111", "password": "1234"}), options.fail_checkout),
    )?;

    tokio::time::sleep(Duration::from_secs(options.seconds)).await;
    component.unmount();
    tokio::time::sleep(Duration::from_millis(50)).await;

    flush_remaining(&app, config).await;

    let report = DemoReport {
        state: app.get_state(),
        pending_log_events: app.logger().collect().len(),
        navigation_prompt: app.navigation_prompt().map(str::to_string),
    };
    handle.shutdown();
    info!("Demo finished");
    Ok(report)
}

async fn flush_remaining(app: &App, config: &AppConfig) {
    if let Some(logger) = app.logger_config().cloned() {
        let transport = Arc::new(StdoutTransport {
            print_batches: config.print_log_batches,
        });
        LogFlushTask::new(app.clone(), logger, transport).flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moduleflow_core::{FrameworkConfig, LoggerConfig};

    fn options(fail_checkout: bool) -> DemoOptions {
        DemoOptions {
            seconds: 3,
            items: vec!["sku-1".to_string(), "sku-2".to_string()],
            fail_checkout,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_checks_out_and_navigates() {
        let report = run_demo(&AppConfig::default(), options(false)).await.unwrap();

        assert_eq!(
            report.state.module("cart"),
            Some(&json!({"items": [], "order_id": "order-2"}))
        );
        let location = report.state.router.location.as_ref().unwrap();
        assert_eq!(location.pathname, "/orders/order-2");
        assert!(report.state.module("clock").unwrap()["ticks"].as_u64().unwrap() >= 3);
        assert_eq!(report.state.loading_count("global"), 0);
        assert!(report.navigation_prompt.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_checkout_keeps_items_and_prevents_navigation() {
        let report = run_demo(&AppConfig::default(), options(true)).await.unwrap();

        assert_eq!(
            report.state.module("cart").unwrap()["items"],
            json!(["sku-1", "sku-2"])
        );
        assert!(report.navigation_prompt.is_some());
        assert_eq!(report.state.loading_count("global"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_logs_flushed_at_exit() {
        let config = AppConfig {
            print_log_batches: false,
            framework: FrameworkConfig::default().with_logger(LoggerConfig {
                sending_frequency_secs: 60,
                ..LoggerConfig::default()
            }),
            ..AppConfig::default()
        };

        let report = run_demo(&config, options(false)).await.unwrap();
        assert_eq!(report.pending_log_events, 0);
    }

    #[test]
    fn test_list_actions() {
        let actions = list_actions(&AppConfig::default()).unwrap();
        assert_eq!(
            actions,
            vec![
                "cart/addItem",
                "cart/checkout",
                "cart/onRegister",
                "clock/onDestroy",
                "clock/onRender",
                "clock/onTick",
            ]
        );
    }
}
