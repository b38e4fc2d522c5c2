//! Exchange port for prices and order execution.
//!
//! [`ExchangeConnector`] is implemented once per exchange. The coordinator
//! talks to the [`OrderGateway`], which routes by exchange id, and detection
//! reads prices through a [`PriceOracle`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ExchangeId, OrderId, Price, PriceSnapshot, Side, Symbol, Volume};
use crate::error::GatewayError;

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Rests at `price` until filled or cancelled.
    Limit,
    /// Fills at the best available price.
    Market,
}

/// Represents an order to be placed on a named exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Exchange to route to.
    pub exchange: ExchangeId,
    /// Trading pair.
    pub symbol: Symbol,
    /// Buy or sell.
    pub side: Side,
    /// Limit or market.
    pub order_type: OrderType,
    /// Size in base asset units.
    pub quantity: Volume,
    /// Limit price, required for limit orders.
    pub price: Option<Price>,
}

impl OrderRequest {
    /// A limit order at `price`.
    pub fn limit(
        exchange: ExchangeId,
        symbol: Symbol,
        side: Side,
        quantity: Volume,
        price: Price,
    ) -> Self {
        Self {
            exchange,
            symbol,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
        }
    }

    /// A market order, filled at whatever the exchange quotes.
    pub fn market(exchange: ExchangeId, symbol: Symbol, side: Side, quantity: Volume) -> Self {
        Self {
            exchange,
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
        }
    }
}

/// Exchange-side status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted and resting.
    Open,
    /// Fully filled.
    Filled,
    /// Cancelled before filling.
    Cancelled,
    /// Refused by the exchange after acceptance.
    Rejected,
}

/// What the exchange reports about an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderHandle {
    pub order_id: OrderId,
    pub status: OrderStatus,
    /// Average fill price, set once the order is filled.
    pub fill_price: Option<Price>,
}

impl OrderHandle {
    /// An order that is still open.
    pub fn open(order_id: OrderId) -> Self {
        Self {
            order_id,
            status: OrderStatus::Open,
            fill_price: None,
        }
    }

    /// An order that filled at `price`.
    pub fn filled(order_id: OrderId, price: Price) -> Self {
        Self {
            order_id,
            status: OrderStatus::Filled,
            fill_price: Some(price),
        }
    }

    /// Check if the order is filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

/// Places, cancels and queries orders on any registered exchange.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order.
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderHandle, GatewayError>;

    /// Cancel an open order. Returns `false` if it was no longer cancellable.
    async fn cancel_order(
        &self,
        exchange: &ExchangeId,
        order_id: &OrderId,
    ) -> Result<bool, GatewayError>;

    /// Query the current status of an order.
    async fn order_status(
        &self,
        exchange: &ExchangeId,
        order_id: &OrderId,
    ) -> Result<OrderHandle, GatewayError>;
}

/// A single exchange: price feed plus order entry.
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Identifier used in snapshots, fee schedules and order routing.
    fn id(&self) -> &ExchangeId;

    /// Current price for a symbol.
    async fn fetch_price(&self, symbol: &Symbol) -> Result<Price, GatewayError>;

    /// Submit an order on this exchange.
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderHandle, GatewayError>;

    /// Cancel an open order on this exchange.
    async fn cancel_order(&self, order_id: &OrderId) -> Result<bool, GatewayError>;

    /// Query an order on this exchange.
    async fn order_status(&self, order_id: &OrderId) -> Result<OrderHandle, GatewayError>;
}

/// Supplies per-symbol snapshots across exchanges.
///
/// Best effort: exchanges that fail to answer are left out of the snapshot.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn snapshot(&self, symbol: &Symbol) -> PriceSnapshot;
}
