//! Paper-trading exchange connector.
//!
//! Quotes follow a bounded random walk around a base price. Every order fills
//! immediately: limit orders at their limit, market orders at the current
//! quote shifted against the trader by the configured slippage. Nothing
//! leaves the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{ExchangeId, OrderId, Percent, Price, Side, Symbol};
use crate::error::GatewayError;
use crate::port::outbound::exchange::{
    ExchangeConnector, OrderHandle, OrderRequest, OrderStatus, OrderType,
};

const PRICE_DP: u32 = 8;

/// Simulated exchange for dry runs and tests.
#[derive(Debug)]
pub struct PaperConnector {
    id: ExchangeId,
    base_price: Price,
    volatility_percent: Percent,
    slippage_percent: Percent,
    prices: Mutex<HashMap<Symbol, Price>>,
    orders: Mutex<HashMap<OrderId, OrderHandle>>,
    next_id: AtomicU64,
}

impl PaperConnector {
    /// Create a connector whose quotes start at `base_price` for every symbol.
    ///
    /// Each quote moves by at most `volatility_percent` of the previous one.
    pub fn new(
        id: ExchangeId,
        base_price: Price,
        volatility_percent: Percent,
        slippage_percent: Percent,
    ) -> Self {
        Self {
            id,
            base_price,
            volatility_percent: volatility_percent.abs(),
            slippage_percent: slippage_percent.abs(),
            prices: Mutex::new(HashMap::new()),
            orders: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// A connector that always quotes `price` and fills without slippage.
    pub fn fixed(id: ExchangeId, price: Price) -> Self {
        Self::new(id, price, Decimal::ZERO, Decimal::ZERO)
    }

    /// Number of orders accepted so far.
    pub fn order_count(&self) -> usize {
        self.orders.lock().len()
    }

    fn next_quote(&self, symbol: &Symbol) -> Price {
        let mut prices = self.prices.lock();
        let current = *prices.entry(symbol.clone()).or_insert(self.base_price);
        if self.volatility_percent.is_zero() {
            return current;
        }

        // Uniform step in [-1, 1] with three decimal places.
        let step = Decimal::new(rand::thread_rng().gen_range(-1000..=1000), 3);
        let moved = (current + current * self.volatility_percent / Decimal::ONE_HUNDRED * step)
            .round_dp(PRICE_DP);
        if moved > Decimal::ZERO {
            prices.insert(symbol.clone(), moved);
            moved
        } else {
            current
        }
    }

    fn fill_price(&self, request: &OrderRequest, reference: Price) -> Price {
        let shift = reference * self.slippage_percent / Decimal::ONE_HUNDRED;
        match request.side {
            Side::Buy => reference + shift,
            Side::Sell => reference - shift,
        }
    }

    fn next_order_id(&self) -> OrderId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        OrderId::new(format!("paper-{}-{n}", self.id))
    }

    fn rejected(&self, reason: impl Into<String>) -> GatewayError {
        GatewayError::ExchangeRejected {
            exchange: self.id.clone(),
            reason: reason.into(),
        }
    }

    fn not_found(&self, order_id: &OrderId) -> GatewayError {
        GatewayError::OrderNotFound {
            exchange: self.id.clone(),
            order_id: order_id.to_string(),
        }
    }
}

#[async_trait]
impl ExchangeConnector for PaperConnector {
    fn id(&self) -> &ExchangeId {
        &self.id
    }

    async fn fetch_price(&self, symbol: &Symbol) -> Result<Price, GatewayError> {
        Ok(self.next_quote(symbol))
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<OrderHandle, GatewayError> {
        if request.quantity <= Decimal::ZERO {
            return Err(self.rejected(format!("quantity {} must be positive", request.quantity)));
        }
        let fill = match (request.order_type, request.price) {
            (OrderType::Limit, Some(price)) if price > Decimal::ZERO => price,
            (OrderType::Limit, _) => return Err(self.rejected("limit order without a positive price")),
            (OrderType::Market, _) => self.fill_price(request, self.next_quote(&request.symbol)),
        };
        let handle = OrderHandle::filled(self.next_order_id(), fill);
        debug!(
            exchange = %self.id,
            symbol = %request.symbol,
            side = %request.side,
            quantity = %request.quantity,
            fill_price = %fill,
            order_id = %handle.order_id,
            "Paper order filled"
        );
        self.orders
            .lock()
            .insert(handle.order_id.clone(), handle.clone());
        Ok(handle)
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<bool, GatewayError> {
        let mut orders = self.orders.lock();
        let handle = orders
            .get_mut(order_id)
            .ok_or_else(|| self.not_found(order_id))?;
        if handle.status != OrderStatus::Open {
            return Ok(false);
        }
        handle.status = OrderStatus::Cancelled;
        Ok(true)
    }

    async fn order_status(&self, order_id: &OrderId) -> Result<OrderHandle, GatewayError> {
        self.orders
            .lock()
            .get(order_id)
            .cloned()
            .ok_or_else(|| self.not_found(order_id))
    }
}
