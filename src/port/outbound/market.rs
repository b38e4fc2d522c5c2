//! Market conditions port used by the volatility and liquidity checks.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Percent, Symbol};
use crate::error::Result;

/// Runtime facts about a market, sampled just before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketConditions {
    /// Recent volatility, in percent.
    pub volatility_percent: Percent,
    /// Order book depth in quote currency.
    pub liquidity_depth: Decimal,
}

/// Source of [`MarketConditions`] for a symbol.
#[async_trait]
pub trait MarketConditionsSource: Send + Sync {
    async fn conditions(&self, symbol: &Symbol) -> Result<MarketConditions>;
}
