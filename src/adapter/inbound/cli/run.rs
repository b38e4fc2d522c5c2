//! Handler for the `run` command.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use super::command::RunArgs;
use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_engine;
use crate::infrastructure::config::logging::LogFormat;
use crate::infrastructure::config::settings::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    apply_overrides(&mut config, args);
    config.init_logging();

    print_startup(&config);
    info!(
        symbols = ?config.arbitrage.symbols,
        exchanges = config.enabled_exchanges().count(),
        trade_execution_enabled = config.arbitrage.trade_execution_enabled,
        "crossarb starting"
    );

    let engine = Arc::new(build_engine(&config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut handle = tokio::spawn(Arc::clone(&engine).run(shutdown_rx));

    tokio::select! {
        result = &mut handle => {
            if let Err(e) = result {
                error!(error = %e, "Engine task failed");
            }
            info!("crossarb stopped");
            return Ok(());
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received (Ctrl+C)");
            let _ = shutdown_tx.send(true);
        }
    }

    if let Err(e) = handle.await {
        error!(error = %e, "Engine task failed");
    }
    info!("crossarb stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = LogFormat::Json;
    }
    if args.dry_run {
        config.arbitrage.trade_execution_enabled = false;
    }
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Symbols", config.arbitrage.symbols.join(", "));
    let exchanges: Vec<_> = config.enabled_exchanges().map(|(name, _)| name).collect();
    output::field("Exchanges", exchanges.join(", "));
    output::field("Detection", format!("{:?}", config.arbitrage.detection_mode));
    output::field("Min profit", format!("{}%", config.risk.min_profit_percent));
    if config.arbitrage.trade_execution_enabled {
        output::warning("Trade execution enabled");
    } else {
        output::field("Execution", "disabled (detect and log only)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> RunArgs {
        RunArgs {
            config: PathBuf::from("config.toml"),
            log_level: None,
            json_logs: false,
            dry_run: false,
        }
    }

    fn config() -> Config {
        Config::parse_toml(
            "[arbitrage]\ntrade_execution_enabled = true\n[exchanges.binance]\n[exchanges.kraken]\n",
        )
        .unwrap()
    }

    #[test]
    fn test_dry_run_turns_execution_off() {
        let mut config = config();
        apply_overrides(
            &mut config,
            &RunArgs {
                dry_run: true,
                ..args()
            },
        );
        assert!(!config.arbitrage.trade_execution_enabled);
    }

    #[test]
    fn test_logging_overrides() {
        let mut config = config();
        apply_overrides(
            &mut config,
            &RunArgs {
                log_level: Some("debug".into()),
                json_logs: true,
                ..args()
            },
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.arbitrage.trade_execution_enabled);
    }
}
