//! Scripted order gateway with call counting.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ExchangeId, OrderId, Price};
use crate::error::GatewayError;
use crate::port::outbound::exchange::{OrderGateway, OrderHandle, OrderRequest, OrderStatus};

/// What the next `place_order` on an exchange does.
#[derive(Debug, Clone)]
pub enum PlaceScript {
    /// Fill immediately, at the given price or else the limit price.
    Fill(Option<Price>),
    /// Accept and never fill; cancel succeeds.
    Open,
    /// Accept and never fill; cancel is never confirmed.
    Stuck,
    /// Accept as open and report filled on the first status poll.
    FillOnPoll(Option<Price>),
    /// Fail with this error.
    Fail(GatewayError),
    /// Never answer within any reasonable timeout.
    Hang,
}

impl PlaceScript {
    /// Shorthand for a transient network failure on `exchange`.
    pub fn network(exchange: &str) -> Self {
        Self::Fail(GatewayError::Network {
            exchange: ExchangeId::from(exchange),
            reason: "connection reset".to_string(),
        })
    }

    /// Shorthand for an exchange rejection on `exchange`.
    pub fn rejected(exchange: &str) -> Self {
        Self::Fail(GatewayError::ExchangeRejected {
            exchange: ExchangeId::from(exchange),
            reason: "insufficient balance".to_string(),
        })
    }
}

#[derive(Debug)]
struct ScriptedOrder {
    exchange: ExchangeId,
    handle: OrderHandle,
    fill_on_poll: Option<Price>,
    stuck: bool,
}

/// An [`OrderGateway`] driven by per-exchange queues of [`PlaceScript`]s.
///
/// An exchange with an empty queue fills every order at its limit price.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<ExchangeId, VecDeque<PlaceScript>>>,
    orders: Mutex<HashMap<OrderId, ScriptedOrder>>,
    placed: Mutex<Vec<OrderRequest>>,
    cancelled: Mutex<Vec<OrderId>>,
    next_id: AtomicU64,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses for an exchange.
    pub fn script(&self, exchange: &str, steps: impl IntoIterator<Item = PlaceScript>) {
        self.scripts
            .lock()
            .entry(ExchangeId::from(exchange))
            .or_default()
            .extend(steps);
    }

    /// Builder-style [`script`](Self::script).
    #[must_use]
    pub fn with_script(self, exchange: &str, steps: impl IntoIterator<Item = PlaceScript>) -> Self {
        self.script(exchange, steps);
        self
    }

    /// Every order request received, in order.
    pub fn placed(&self) -> Vec<OrderRequest> {
        self.placed.lock().clone()
    }

    /// Number of `place_order` calls.
    pub fn place_calls(&self) -> usize {
        self.placed.lock().len()
    }

    /// Number of `place_order` calls routed to `exchange`.
    pub fn place_calls_on(&self, exchange: &str) -> usize {
        self.placed
            .lock()
            .iter()
            .filter(|r| r.exchange.as_str() == exchange)
            .count()
    }

    /// Number of `cancel_order` calls.
    pub fn cancel_calls(&self) -> usize {
        self.cancelled.lock().len()
    }

    fn next_order_id(&self) -> OrderId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        OrderId::new(format!("scripted-{n}"))
    }
}

#[async_trait]
impl OrderGateway for ScriptedGateway {
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderHandle, GatewayError> {
        self.placed.lock().push(request.clone());
        let step = self
            .scripts
            .lock()
            .get_mut(&request.exchange)
            .and_then(VecDeque::pop_front)
            .unwrap_or(PlaceScript::Fill(None));
        let limit = request.price.unwrap_or_default();

        let (handle, fill_on_poll, stuck) = match step {
            PlaceScript::Fill(price) => (
                OrderHandle::filled(self.next_order_id(), price.unwrap_or(limit)),
                None,
                false,
            ),
            PlaceScript::Open => (OrderHandle::open(self.next_order_id()), None, false),
            PlaceScript::Stuck => (OrderHandle::open(self.next_order_id()), None, true),
            PlaceScript::FillOnPoll(price) => (
                OrderHandle::open(self.next_order_id()),
                Some(price.unwrap_or(limit)),
                false,
            ),
            PlaceScript::Fail(error) => return Err(error),
            PlaceScript::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                return Err(GatewayError::Timeout {
                    exchange: request.exchange.clone(),
                    after_ms: 0,
                });
            }
        };

        self.orders.lock().insert(
            handle.order_id.clone(),
            ScriptedOrder {
                exchange: request.exchange.clone(),
                handle: handle.clone(),
                fill_on_poll,
                stuck,
            },
        );
        Ok(handle)
    }

    async fn cancel_order(
        &self,
        exchange: &ExchangeId,
        order_id: &OrderId,
    ) -> Result<bool, GatewayError> {
        self.cancelled.lock().push(order_id.clone());
        let mut orders = self.orders.lock();
        let order = orders
            .get_mut(order_id)
            .filter(|o| &o.exchange == exchange)
            .ok_or_else(|| GatewayError::OrderNotFound {
                exchange: exchange.clone(),
                order_id: order_id.to_string(),
            })?;

        if order.stuck || order.handle.status != OrderStatus::Open {
            return Ok(false);
        }
        order.handle.status = OrderStatus::Cancelled;
        order.fill_on_poll = None;
        Ok(true)
    }

    async fn order_status(
        &self,
        exchange: &ExchangeId,
        order_id: &OrderId,
    ) -> Result<OrderHandle, GatewayError> {
        let mut orders = self.orders.lock();
        let order = orders
            .get_mut(order_id)
            .filter(|o| &o.exchange == exchange)
            .ok_or_else(|| GatewayError::OrderNotFound {
                exchange: exchange.clone(),
                order_id: order_id.to_string(),
            })?;

        if let Some(price) = order.fill_on_poll.take() {
            order.handle.status = OrderStatus::Filled;
            order.handle.fill_price = Some(price);
        }
        Ok(order.handle.clone())
    }
}
