//! Trade legs of a two-sided arbitrage.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{ExchangeId, OrderId, Symbol};
use super::money::{Price, Volume};

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy the base asset.
    Buy,
    /// Sell the base asset.
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Lifecycle of a single leg's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegStatus {
    /// Nothing placed yet.
    Pending,
    /// Order accepted by the exchange, not yet filled.
    Placed,
    /// Order filled.
    Filled,
    /// Exchange refused the order, or attempts ran out.
    Rejected,
    /// Order was cancelled.
    Cancelled,
}

/// One side of an arbitrage execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLeg {
    exchange: ExchangeId,
    symbol: Symbol,
    side: Side,
    quantity: Volume,
    limit_price: Price,
    status: LegStatus,
    order_id: Option<OrderId>,
    fill_price: Option<Price>,
    attempts: u32,
    slippage_exceeded: bool,
    last_error: Option<String>,
}

impl TradeLeg {
    /// Create a pending leg.
    pub fn new(
        exchange: ExchangeId,
        symbol: Symbol,
        side: Side,
        quantity: Volume,
        limit_price: Price,
    ) -> Self {
        Self {
            exchange,
            symbol,
            side,
            quantity,
            limit_price,
            status: LegStatus::Pending,
            order_id: None,
            fill_price: None,
            attempts: 0,
            slippage_exceeded: false,
            last_error: None,
        }
    }

    pub fn exchange(&self) -> &ExchangeId {
        &self.exchange
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn quantity(&self) -> Volume {
        self.quantity
    }

    pub fn limit_price(&self) -> Price {
        self.limit_price
    }

    pub fn status(&self) -> LegStatus {
        self.status
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        self.order_id.as_ref()
    }

    pub fn fill_price(&self) -> Option<Price> {
        self.fill_price
    }

    /// Number of placement attempts made for this leg.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn slippage_exceeded(&self) -> bool {
        self.slippage_exceeded
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_filled(&self) -> bool {
        self.status == LegStatus::Filled
    }

    /// Count a new placement attempt and return the running total.
    pub(crate) fn record_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    pub(crate) fn mark_placed(&mut self, order_id: OrderId) {
        self.order_id = Some(order_id);
        self.status = LegStatus::Placed;
    }

    pub(crate) fn mark_filled(&mut self, fill_price: Price) {
        self.fill_price = Some(fill_price);
        self.status = LegStatus::Filled;
    }

    pub(crate) fn mark_rejected(&mut self, reason: impl Into<String>) {
        self.last_error = Some(reason.into());
        self.status = LegStatus::Rejected;
    }

    pub(crate) fn mark_cancelled(&mut self, reason: impl Into<String>) {
        self.last_error = Some(reason.into());
        self.status = LegStatus::Cancelled;
    }

    /// Keep the order id of an order that could not be confirmed cancelled.
    pub(crate) fn mark_left_open(&mut self, reason: impl Into<String>) {
        self.last_error = Some(reason.into());
        self.status = LegStatus::Placed;
    }

    /// Remember a transient failure without changing status.
    pub(crate) fn note_error(&mut self, reason: impl Into<String>) {
        self.last_error = Some(reason.into());
    }

    pub(crate) fn flag_slippage(&mut self) {
        self.slippage_exceeded = true;
    }

    /// Forget a previous order that was cancelled before a retry.
    pub(crate) fn reset_order(&mut self) {
        self.order_id = None;
        self.status = LegStatus::Pending;
    }
}
