//! Per-exchange fee schedule.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ExchangeId;
use super::money::Percent;

/// Fees charged by one exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeFees {
    /// Taker fee as a percentage of notional.
    #[serde(default)]
    pub trading_fee_percent: Percent,
    /// Withdrawal fee per asset, as a percentage of the withdrawn value.
    #[serde(default)]
    pub withdrawal_fee_percent: HashMap<String, Percent>,
}

impl ExchangeFees {
    /// Fees with only a trading component.
    #[must_use]
    pub fn trading(trading_fee_percent: Percent) -> Self {
        Self {
            trading_fee_percent,
            withdrawal_fee_percent: HashMap::new(),
        }
    }

    /// Add a withdrawal fee for an asset.
    #[must_use]
    pub fn with_withdrawal(mut self, asset: impl Into<String>, percent: Percent) -> Self {
        self.withdrawal_fee_percent.insert(asset.into(), percent);
        self
    }
}

/// Fee lookup across exchanges.
///
/// An exchange missing from the schedule, or an asset missing from an
/// exchange's withdrawal table, costs nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeSchedule(BTreeMap<ExchangeId, ExchangeFees>);

impl FeeSchedule {
    /// Create an empty (fee-free) schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fees for an exchange.
    #[must_use]
    pub fn with(mut self, exchange: impl Into<ExchangeId>, fees: ExchangeFees) -> Self {
        self.0.insert(exchange.into(), fees);
        self
    }

    /// Fees for an exchange, if configured.
    pub fn get(&self, exchange: &ExchangeId) -> Option<&ExchangeFees> {
        self.0.get(exchange)
    }

    /// Trading fee percent for an exchange, zero if unknown.
    #[must_use]
    pub fn trading_fee_percent(&self, exchange: &ExchangeId) -> Percent {
        self.0
            .get(exchange)
            .map_or(Decimal::ZERO, |f| f.trading_fee_percent)
    }

    /// Withdrawal fee percent for an asset on an exchange, zero if unknown.
    #[must_use]
    pub fn withdrawal_fee_percent(&self, exchange: &ExchangeId, asset: &str) -> Percent {
        self.0
            .get(exchange)
            .and_then(|f| f.withdrawal_fee_percent.get(asset))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Iterate configured exchanges.
    pub fn exchanges(&self) -> impl Iterator<Item = &ExchangeId> {
        self.0.keys()
    }
}
