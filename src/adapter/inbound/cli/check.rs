//! Handler for the `check` command.

use std::path::Path;

use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_fee_schedule;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::exchange::ExchangeRegistry;

/// Validate configuration and the exchange registry without trading.
pub fn execute<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;
    let registry = ExchangeRegistry::from_config(&config)?;
    let fees = build_fee_schedule(&config)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Symbols", config.arbitrage.symbols.join(", "));
    output::field("Detection", format!("{:?}", config.arbitrage.detection_mode));
    output::field("Min profit", format!("{}%", config.risk.min_profit_percent));
    output::field("Max order", config.risk.max_order_size);
    output::field("Max retries", config.risk.max_retries);
    output::field("Cooldown", format!("{}s", config.risk.cooldown_seconds));
    output::field("Pool size", config.execution.max_concurrent);
    output::field(
        "Audit log",
        config.execution.audit_path().unwrap_or("disabled"),
    );

    output::section("Exchanges");
    for id in registry.ids() {
        output::field(
            id.as_str(),
            format!("trading fee {}%", fees.trading_fee_percent(id)),
        );
    }
    for exchange in fees.exchanges() {
        if registry.get(exchange).is_none() {
            output::warning(&format!("Fees configured for {exchange}, which is not enabled"));
        }
    }

    if config.arbitrage.trade_execution_enabled {
        output::warning("Trade execution is enabled");
    } else {
        output::field("Execution", "disabled");
    }

    output::success("Configuration check complete");
    Ok(())
}
