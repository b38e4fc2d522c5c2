//! Assumed market conditions for the volatility and liquidity checks.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::port::outbound::market::MarketConditions;

/// `[market]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_volatility_percent")]
    pub volatility_percent: Decimal,
    /// Order book depth in quote currency.
    #[serde(default = "default_liquidity_depth")]
    pub liquidity_depth: Decimal,
}

fn default_volatility_percent() -> Decimal {
    Decimal::ONE
}

fn default_liquidity_depth() -> Decimal {
    Decimal::from(1_000_000)
}

impl MarketConfig {
    #[must_use]
    pub fn conditions(&self) -> MarketConditions {
        MarketConditions {
            volatility_percent: self.volatility_percent,
            liquidity_depth: self.liquidity_depth,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            volatility_percent: default_volatility_percent(),
            liquidity_depth: default_liquidity_depth(),
        }
    }
}
