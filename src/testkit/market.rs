//! Static price and market-condition sources.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{ExchangeId, Price, PriceSnapshot, Symbol};
use crate::error::{Error, Result};
use crate::port::outbound::exchange::PriceOracle;
use crate::port::outbound::market::{MarketConditions, MarketConditionsSource};

/// Oracle returning fixed prices per symbol, stamped with a fixed time.
#[derive(Debug)]
pub struct StaticOracle {
    taken_at: DateTime<Utc>,
    prices: Mutex<HashMap<Symbol, Vec<(ExchangeId, Price)>>>,
}

impl StaticOracle {
    pub fn new(taken_at: DateTime<Utc>) -> Self {
        Self {
            taken_at,
            prices: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the quotes for a symbol.
    pub fn set(&self, symbol: &str, quotes: &[(&str, Price)]) {
        self.prices.lock().insert(
            Symbol::from(symbol),
            quotes
                .iter()
                .map(|(ex, p)| (ExchangeId::from(*ex), *p))
                .collect(),
        );
    }

    #[must_use]
    pub fn with(self, symbol: &str, quotes: &[(&str, Price)]) -> Self {
        self.set(symbol, quotes);
        self
    }
}

#[async_trait]
impl PriceOracle for StaticOracle {
    async fn snapshot(&self, symbol: &Symbol) -> PriceSnapshot {
        let mut snapshot = PriceSnapshot::new(symbol.clone(), self.taken_at);
        if let Some(quotes) = self.prices.lock().get(symbol) {
            for (exchange, price) in quotes {
                // Non-positive prices are left out, like a failed exchange.
                let _ = snapshot.insert(exchange.clone(), *price, self.taken_at);
            }
        }
        snapshot
    }
}

/// Market conditions source returning the same answer every time.
#[derive(Debug, Clone)]
pub struct FixedConditions {
    conditions: Option<MarketConditions>,
}

impl FixedConditions {
    pub fn new(volatility_percent: Decimal, liquidity_depth: Decimal) -> Self {
        Self {
            conditions: Some(MarketConditions {
                volatility_percent,
                liquidity_depth,
            }),
        }
    }

    /// Low volatility, deep book: passes default thresholds.
    pub fn calm() -> Self {
        Self::new(Decimal::ONE, Decimal::from(1_000_000))
    }

    /// Always fails, as if the data feed were down.
    pub fn unavailable() -> Self {
        Self { conditions: None }
    }
}

#[async_trait]
impl MarketConditionsSource for FixedConditions {
    async fn conditions(&self, symbol: &Symbol) -> Result<MarketConditions> {
        self.conditions.ok_or_else(|| Error::ExchangeUnavailable {
            exchange: ExchangeId::from("market-data"),
            reason: format!("no conditions for {symbol}"),
        })
    }
}
