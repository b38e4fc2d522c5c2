//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Every section and field has a default, so an empty file is a valid
//! configuration apart from the exchange list.
//!
//! # Example
//!
//! ```no_run
//! use crossarb::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::arbitrage::ArbitrageConfig;
use super::exchange::ExchangeConfig;
use super::execution::ExecutionConfig;
use super::logging::LoggingConfig;
use super::market::MarketConfig;
use super::risk::RiskConfig;
use crate::domain::{FeeSchedule, RiskPolicy, Symbol};
use crate::error::{ConfigError, Result};
use crate::infrastructure::exchange::ExchangeKind;

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Symbols, polling cadence, detection mode and the kill switch.
    #[serde(default)]
    pub arbitrage: ArbitrageConfig,

    /// Risk limits shared by detection, gating and execution.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Order timing, retry backoff, pool size and audit output.
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Assumed volatility and liquidity.
    #[serde(default)]
    pub market: MarketConfig,

    /// Trading and withdrawal fees per exchange.
    #[serde(default)]
    pub fees: FeeSchedule,

    /// Exchanges to connect to, keyed by name.
    #[serde(default)]
    pub exchanges: BTreeMap<String, ExchangeConfig>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present, exchange names are
    /// known, and values are within acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        self.validate_exchanges()?;
        self.validate_arbitrage()?;
        self.validate_risk()?;
        self.validate_execution()?;
        Ok(())
    }

    fn validate_exchanges(&self) -> Result<()> {
        for name in self.exchanges.keys() {
            ExchangeKind::from_str(name)?;
        }
        for exchange in self.fees.exchanges() {
            ExchangeKind::from_str(exchange.as_str())?;
        }

        let enabled: Vec<_> = self.enabled_exchanges().collect();
        if enabled.is_empty() {
            return Err(ConfigError::MissingField { field: "exchanges" }.into());
        }
        if enabled.len() < 2 {
            return Err(invalid("exchanges", "at least two enabled exchanges are required"));
        }
        for (_, exchange) in enabled {
            if exchange.paper_price <= Decimal::ZERO {
                return Err(invalid("paper_price", "must be greater than 0"));
            }
            if exchange.paper_volatility_percent < Decimal::ZERO
                || exchange.paper_slippage_percent < Decimal::ZERO
            {
                return Err(invalid("exchanges", "paper percentages must be 0 or greater"));
            }
        }
        Ok(())
    }

    fn validate_arbitrage(&self) -> Result<()> {
        let arb = &self.arbitrage;
        if arb.symbols.is_empty() {
            return Err(ConfigError::MissingField { field: "symbols" }.into());
        }
        for symbol in &arb.symbols {
            let valid = symbol
                .split_once('/')
                .is_some_and(|(base, quote)| !base.is_empty() && !quote.is_empty());
            if !valid {
                return Err(invalid(
                    "symbols",
                    format!("'{symbol}' is not of the form BASE/QUOTE"),
                ));
            }
        }
        if arb.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be greater than 0"));
        }
        if arb.quote_timeout_ms == 0 {
            return Err(invalid("quote_timeout_ms", "must be greater than 0"));
        }
        if arb.trade_size <= Decimal::ZERO {
            return Err(invalid("trade_size", "must be greater than 0"));
        }
        if arb.portfolio_value <= Decimal::ZERO {
            return Err(invalid("portfolio_value", "must be greater than 0"));
        }
        Ok(())
    }

    fn validate_risk(&self) -> Result<()> {
        let risk = &self.risk;
        if risk.max_order_size <= Decimal::ZERO {
            return Err(invalid("max_order_size", "must be greater than 0"));
        }
        if risk.max_exposure_percent <= Decimal::ZERO
            || risk.max_exposure_percent > Decimal::ONE_HUNDRED
        {
            return Err(invalid("max_exposure_percent", "must be in (0, 100]"));
        }
        let non_negative = [
            ("min_profit_percent", risk.min_profit_percent),
            ("stop_loss_percent", risk.stop_loss_percent),
            ("max_slippage_percent", risk.max_slippage_percent),
            ("high_volatility_threshold", risk.high_volatility_threshold),
            ("low_liquidity_threshold", risk.low_liquidity_threshold),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(invalid(field, "must be 0 or greater"));
            }
        }
        let seconds = [
            ("cooldown_seconds", risk.cooldown_seconds),
            ("retry_backoff_seconds", risk.retry_backoff_seconds),
            ("max_transfer_seconds", risk.max_transfer_seconds),
        ];
        for (field, value) in seconds {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a finite number of seconds, 0 or greater"));
            }
        }
        Ok(())
    }

    fn validate_execution(&self) -> Result<()> {
        let exec = &self.execution;
        if exec.order_timeout_ms == 0 {
            return Err(invalid("order_timeout_ms", "must be greater than 0"));
        }
        if exec.fill_poll_interval_ms == 0 {
            return Err(invalid("fill_poll_interval_ms", "must be greater than 0"));
        }
        if exec.fill_timeout_ms < exec.fill_poll_interval_ms {
            return Err(invalid("fill_timeout_ms", "must be >= fill_poll_interval_ms"));
        }
        if exec.max_concurrent == 0 {
            return Err(invalid("max_concurrent", "must be greater than 0"));
        }
        Ok(())
    }

    /// Enabled exchanges in name order.
    pub fn enabled_exchanges(&self) -> impl Iterator<Item = (&str, &ExchangeConfig)> {
        self.exchanges
            .iter()
            .filter(|(_, c)| c.enabled)
            .map(|(name, c)| (name.as_str(), c))
    }

    /// Configured symbols.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.arbitrage
            .symbols
            .iter()
            .map(|s| Symbol::from(s.as_str()))
            .collect()
    }

    /// Risk policy built from the `[risk]` section.
    #[must_use]
    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy::from(self.risk.clone())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}
