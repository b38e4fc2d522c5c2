//! Detection loop configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::detector::DetectionMode;

/// `[arbitrage]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ArbitrageConfig {
    /// Trading pairs to watch, as `BASE/QUOTE`.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Time between detection cycles per symbol.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Per-exchange quote deadline within one snapshot.
    #[serde(default = "default_quote_timeout_ms")]
    pub quote_timeout_ms: u64,
    #[serde(default)]
    pub detection_mode: DetectionMode,
    /// Global kill switch. When false, opportunities are only logged.
    #[serde(default)]
    pub trade_execution_enabled: bool,
    /// Portfolio value used by the exposure check, in base asset units.
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: Decimal,
    /// Size of every trade, in base asset units.
    #[serde(default = "default_trade_size")]
    pub trade_size: Decimal,
}

fn default_symbols() -> Vec<String> {
    vec!["BTC/USDT".to_string()]
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

const fn default_quote_timeout_ms() -> u64 {
    2000
}

fn default_portfolio_value() -> Decimal {
    Decimal::from(10)
}

fn default_trade_size() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            poll_interval_ms: default_poll_interval_ms(),
            quote_timeout_ms: default_quote_timeout_ms(),
            detection_mode: DetectionMode::default(),
            trade_execution_enabled: false,
            portfolio_value: default_portfolio_value(),
            trade_size: default_trade_size(),
        }
    }
}
