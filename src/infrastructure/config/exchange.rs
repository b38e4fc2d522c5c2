//! Per-exchange configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

/// `[exchanges.<name>]` section.
///
/// Connectors run in paper mode: quotes random-walk around `paper_price`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Starting quote for every symbol.
    #[serde(default = "default_paper_price")]
    pub paper_price: Decimal,
    /// Largest move between two quotes, in percent.
    #[serde(default = "default_paper_volatility_percent")]
    pub paper_volatility_percent: Decimal,
    /// Market order fill offset against the trader, in percent.
    #[serde(default)]
    pub paper_slippage_percent: Decimal,
}

const fn default_enabled() -> bool {
    true
}

fn default_paper_price() -> Decimal {
    Decimal::from(100)
}

fn default_paper_volatility_percent() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            paper_price: default_paper_price(),
            paper_volatility_percent: default_paper_volatility_percent(),
            paper_slippage_percent: Decimal::ZERO,
        }
    }
}
