//! Cross-exchange price snapshot for a single symbol.
//!
//! A snapshot is built fresh for every detection cycle. Exchanges that did not
//! report are simply absent; there is no zero or placeholder quote.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{ExchangeId, Symbol};
use super::money::Price;

/// A single exchange's price observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Last traded or mid price.
    pub price: Price,
    /// When the exchange reported it.
    pub observed_at: DateTime<Utc>,
}

/// Prices for one symbol across the exchanges that answered.
///
/// Quotes are held in an ordered map so iteration is by exchange identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    symbol: Symbol,
    taken_at: DateTime<Utc>,
    quotes: BTreeMap<ExchangeId, Quote>,
}

impl PriceSnapshot {
    /// Create an empty snapshot.
    pub fn new(symbol: Symbol, taken_at: DateTime<Utc>) -> Self {
        Self {
            symbol,
            taken_at,
            quotes: BTreeMap::new(),
        }
    }

    /// Record a quote for an exchange, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositivePrice`] if `price` is zero or negative.
    pub fn insert(
        &mut self,
        exchange: ExchangeId,
        price: Price,
        observed_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if price <= Price::ZERO {
            return Err(DomainError::NonPositivePrice { price });
        }
        self.quotes.insert(exchange, Quote { price, observed_at });
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositivePrice`] if `price` is zero or negative.
    pub fn with_quote(
        mut self,
        exchange: impl Into<ExchangeId>,
        price: Price,
    ) -> Result<Self, DomainError> {
        let observed_at = self.taken_at;
        self.insert(exchange.into(), price, observed_at)?;
        Ok(self)
    }

    /// The symbol this snapshot covers.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// When the snapshot was assembled.
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Quote for a given exchange, if it reported.
    pub fn quote(&self, exchange: &ExchangeId) -> Option<&Quote> {
        self.quotes.get(exchange)
    }

    /// Price for a given exchange, if it reported.
    pub fn price(&self, exchange: &ExchangeId) -> Option<Price> {
        self.quotes.get(exchange).map(|q| q.price)
    }

    /// Iterate quotes ordered by exchange identifier.
    pub fn iter(&self) -> impl Iterator<Item = (&ExchangeId, &Quote)> {
        self.quotes.iter()
    }

    /// Number of exchanges that reported.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether no exchange reported.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
