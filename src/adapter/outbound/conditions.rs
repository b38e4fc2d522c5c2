//! Static market conditions.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::Symbol;
use crate::error::Result;
use crate::port::outbound::market::{MarketConditions, MarketConditionsSource};

/// Reports configured conditions, with optional per-symbol overrides.
#[derive(Debug, Clone)]
pub struct StaticConditions {
    default: MarketConditions,
    overrides: HashMap<Symbol, MarketConditions>,
}

impl StaticConditions {
    pub fn new(default: MarketConditions) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: Symbol, conditions: MarketConditions) -> Self {
        self.overrides.insert(symbol, conditions);
        self
    }
}

#[async_trait]
impl MarketConditionsSource for StaticConditions {
    async fn conditions(&self, symbol: &Symbol) -> Result<MarketConditions> {
        Ok(self.overrides.get(symbol).copied().unwrap_or(self.default))
    }
}
