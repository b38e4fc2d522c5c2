//! Two-leg execution coordinator.
//!
//! Drives one [`ArbitrageExecution`] through its state machine: risk
//! admission, buy leg, transfer delay, sell leg. Each leg is a bounded
//! retry loop around a limit order that is polled until filled or until the
//! fill deadline, then cancelled.
//!
//! Outcomes:
//! - any admission check fails: `RiskRejected`, no order placed
//! - buy leg never fills, or abort requested first: `Aborted`
//! - sell leg never fills after the buy filled: `FailedPartial`
//! - both fill: `Completed`
//!
//! An order whose cancel cannot be confirmed is never replaced. The leg stops
//! there and the execution ends with [`ExecutionFailure::OrderLeftOpen`]:
//! `Aborted` on the buy side, `FailedPartial` on the sell side.
//!
//! Every terminal execution goes to the audit sink and the notifier.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};

use super::abort::AbortHandle;
use super::retry::{BackoffKind, RetryPolicy};
use crate::application::risk::{CooldownScope, CooldownTracker, RiskGate};
use crate::domain::{
    ArbitrageExecution, ArbitrageOpportunity, AuditRecord, ExchangeId, ExecutionFailure,
    ExecutionState, OrderId, Price, RiskPolicy, Side, Volume,
};
use crate::domain::policy::saturating_millis;
use crate::error::{GatewayError, Result, RiskError};
use crate::port::outbound::audit::{AuditSink, NullAuditSink};
use crate::port::outbound::clock::{Clock, SystemClock};
use crate::port::outbound::exchange::{OrderGateway, OrderHandle, OrderRequest, OrderStatus};
use crate::port::outbound::market::MarketConditionsSource;
use crate::port::outbound::notifier::{
    Event, ExecutionEvent, Notifier, NullNotifier, PartialFailureEvent, RiskEvent,
};

/// Timing knobs for order handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionSettings {
    /// Upper bound on any single gateway call.
    pub order_timeout: Duration,
    /// How long a placed order may stay open before it is cancelled.
    pub fill_timeout: Duration,
    /// Interval between order status polls.
    pub fill_poll_interval: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            order_timeout: Duration::from_secs(10),
            fill_timeout: Duration::from_secs(30),
            fill_poll_interval: Duration::from_millis(500),
        }
    }
}

/// How a leg ended.
#[derive(Debug)]
enum LegOutcome {
    Filled(Price),
    Failed(String),
    Aborted,
    /// Stopped with an order that may still be live.
    LeftOpen(OrderId),
}

/// How waiting on one placed order ended.
#[derive(Debug)]
enum FillOutcome {
    Filled(Price),
    /// Still open at the deadline and cancelled; worth another attempt.
    Unfilled,
    /// The exchange rejected or cancelled the order on its own.
    Rejected(String),
    Aborted,
    /// Cancel requested but never confirmed.
    Unconfirmed,
}

/// Result of trying to cancel an open order.
#[derive(Debug)]
enum CancelOutcome {
    Cancelled,
    Filled(Price),
    Unconfirmed,
}

/// Orchestrates the buy and sell legs of an opportunity.
pub struct ExecutionCoordinator {
    gate: RiskGate,
    cooldown: Arc<CooldownTracker>,
    retry: RetryPolicy,
    gateway: Arc<dyn OrderGateway>,
    conditions: Arc<dyn MarketConditionsSource>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    settings: ExecutionSettings,
}

impl ExecutionCoordinator {
    /// Create a coordinator with a global cooldown, fixed backoff from the
    /// policy, no notifications and no audit trail.
    pub fn new(
        policy: Arc<RiskPolicy>,
        gateway: Arc<dyn OrderGateway>,
        conditions: Arc<dyn MarketConditionsSource>,
    ) -> Self {
        Self {
            retry: RetryPolicy::from_policy(
                &policy,
                BackoffKind::Fixed,
                Duration::from_secs(60),
            ),
            gate: RiskGate::new(policy),
            cooldown: Arc::new(CooldownTracker::new(CooldownScope::Global)),
            gateway,
            conditions,
            notifier: Arc::new(NullNotifier),
            audit: Arc::new(NullAuditSink),
            clock: Arc::new(SystemClock),
            settings: ExecutionSettings::default(),
        }
    }

    /// Share a cooldown tracker with other coordinators.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Arc<CooldownTracker>) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn gate(&self) -> &RiskGate {
        &self.gate
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Execute an opportunity to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns an error only for an invalid trade size or a broken state
    /// machine invariant. Trading failures are reported through the returned
    /// execution's state and failure.
    pub async fn execute(
        &self,
        opportunity: ArbitrageOpportunity,
        trade_size: Volume,
        portfolio_value: Volume,
    ) -> Result<ArbitrageExecution> {
        self.execute_with_abort(opportunity, trade_size, portfolio_value, &AbortHandle::new())
            .await
    }

    /// Execute with an abort handle honoured until the buy leg fills.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn execute_with_abort(
        &self,
        opportunity: ArbitrageOpportunity,
        trade_size: Volume,
        portfolio_value: Volume,
        abort: &AbortHandle,
    ) -> Result<ArbitrageExecution> {
        let mut exec = ArbitrageExecution::new(opportunity, trade_size, self.clock.now())?;
        info!(
            execution_id = %exec.id(),
            opportunity = %exec.opportunity(),
            size = %trade_size,
            "Execution started"
        );

        if abort.is_requested() {
            return self.abort_execution(exec, "abort requested before admission");
        }

        if let Err(error) = self.admit(&exec, portfolio_value).await {
            warn!(execution_id = %exec.id(), error = %error, "Execution rejected by risk gate");
            exec.finish(
                ExecutionState::RiskRejected,
                Some(ExecutionFailure::RiskRejected {
                    error: error.clone(),
                }),
                self.clock.now(),
            )?;
            self.write_audit(&exec);
            self.notifier
                .notify(Event::RiskRejected(RiskEvent::new(&exec, &error)));
            return Ok(exec);
        }

        exec.transition(ExecutionState::BuyPending)?;
        match self.run_leg(&mut exec, Side::Buy, Some(abort)).await {
            LegOutcome::Filled(price) => {
                self.check_slippage(&mut exec, Side::Buy, price);
                exec.transition(ExecutionState::BuyFilled)?;
                if abort.commit() {
                    info!(execution_id = %exec.id(), "Abort ignored, buy leg already filled");
                }
            }
            LegOutcome::Failed(reason) => {
                warn!(execution_id = %exec.id(), reason = %reason, "Buy leg failed, aborting");
                exec.finish(
                    ExecutionState::Aborted,
                    Some(ExecutionFailure::BuyLegFailed { reason }),
                    self.clock.now(),
                )?;
                return Ok(self.complete(exec));
            }
            LegOutcome::Aborted => {
                return self.abort_execution(exec, "abort requested");
            }
            LegOutcome::LeftOpen(order_id) => {
                let failure = Self::left_open(&exec, Side::Buy, order_id);
                error!(execution_id = %exec.id(), failure = %failure, "Buy order left open, aborting");
                exec.finish(ExecutionState::Aborted, Some(failure), self.clock.now())?;
                return Ok(self.complete(exec));
            }
        }

        exec.transition(ExecutionState::Transferring)?;
        let transfer = self.gate.policy().max_transfer();
        debug!(execution_id = %exec.id(), transfer = ?transfer, "Transferring funds");
        tokio::time::sleep(transfer).await;

        exec.transition(ExecutionState::SellPending)?;
        match self.run_leg(&mut exec, Side::Sell, None).await {
            LegOutcome::Filled(price) => {
                self.check_slippage(&mut exec, Side::Sell, price);
                exec.finish(ExecutionState::Completed, None, self.clock.now())?;
                info!(
                    execution_id = %exec.id(),
                    attempts = exec.attempt_count(),
                    "Execution completed"
                );
                Ok(self.complete(exec))
            }
            LegOutcome::Failed(reason) => {
                self.fail_partial(exec, ExecutionFailure::PartialExecution { reason })
            }
            LegOutcome::Aborted => self.fail_partial(
                exec,
                ExecutionFailure::PartialExecution {
                    reason: "sell leg cancelled".to_string(),
                },
            ),
            LegOutcome::LeftOpen(order_id) => {
                let failure = Self::left_open(&exec, Side::Sell, order_id);
                self.fail_partial(exec, failure)
            }
        }
    }

    /// Pre-trade size checks, market conditions, then the cooldown slot.
    ///
    /// The cooldown is checked and stamped last, under one lock, so it is
    /// only consumed by executions that pass everything else.
    async fn admit(
        &self,
        exec: &ArbitrageExecution,
        portfolio_value: Volume,
    ) -> std::result::Result<(), RiskError> {
        self.gate
            .pre_trade(exec.trade_size(), portfolio_value)
            .into_result()?;

        let symbol = exec.opportunity().symbol();
        let conditions = match timeout(
            self.settings.order_timeout,
            self.conditions.conditions(symbol),
        )
        .await
        {
            Ok(Ok(conditions)) => conditions,
            Ok(Err(e)) => {
                return Err(RiskError::MarketDataUnavailable {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(RiskError::MarketDataUnavailable {
                    reason: "timed out".to_string(),
                })
            }
        };
        self.gate
            .market_conditions_ok(conditions.volatility_percent, conditions.liquidity_depth)
            .into_result()?;

        self.cooldown
            .try_reserve(
                &self.gate,
                exec.opportunity().buy_exchange(),
                exec.opportunity().sell_exchange(),
                self.clock.now(),
            )
            .into_result()
    }

    /// Place and fill one leg, retrying transient failures.
    async fn run_leg(
        &self,
        exec: &mut ArbitrageExecution,
        side: Side,
        abort: Option<&AbortHandle>,
    ) -> LegOutcome {
        let execution_id = exec.id();
        let mut retries_done = 0;

        loop {
            if abort.is_some_and(AbortHandle::is_requested) {
                exec.leg_mut(side).mark_cancelled("abort requested");
                return LegOutcome::Aborted;
            }

            let leg = exec.leg(side);
            let request = OrderRequest::limit(
                leg.exchange().clone(),
                leg.symbol().clone(),
                side,
                leg.quantity(),
                leg.limit_price(),
            );
            let attempt = exec.record_attempt(side);
            debug!(
                execution_id = %execution_id,
                side = %side,
                exchange = %request.exchange,
                attempt,
                "Placing order"
            );

            let error = match self.place(&request).await {
                Ok(handle) => {
                    let handle_id = handle.order_id.clone();
                    exec.leg_mut(side).mark_placed(handle.order_id.clone());
                    match self.await_fill(&request, handle, abort).await {
                        FillOutcome::Filled(price) => {
                            exec.leg_mut(side).mark_filled(price);
                            info!(
                                execution_id = %execution_id,
                                side = %side,
                                exchange = %request.exchange,
                                price = %price,
                                attempt,
                                "Leg filled"
                            );
                            return LegOutcome::Filled(price);
                        }
                        FillOutcome::Aborted => {
                            exec.leg_mut(side).mark_cancelled("abort requested");
                            return LegOutcome::Aborted;
                        }
                        FillOutcome::Rejected(reason) => {
                            exec.leg_mut(side).mark_rejected(reason.clone());
                            return LegOutcome::Failed(reason);
                        }
                        FillOutcome::Unfilled => {
                            exec.leg_mut(side).reset_order();
                            "unfilled before deadline".to_string()
                        }
                        FillOutcome::Unconfirmed => {
                            error!(
                                execution_id = %execution_id,
                                side = %side,
                                exchange = %request.exchange,
                                order_id = %handle_id,
                                "Cancel unconfirmed, not placing another order"
                            );
                            exec.leg_mut(side).mark_left_open("cancel unconfirmed");
                            return LegOutcome::LeftOpen(handle_id);
                        }
                    }
                }
                Err(e) if e.is_transient() => e.to_string(),
                Err(e) => {
                    warn!(
                        execution_id = %execution_id,
                        side = %side,
                        error = %e,
                        "Order rejected, not retrying"
                    );
                    exec.leg_mut(side).mark_rejected(e.to_string());
                    return LegOutcome::Failed(e.to_string());
                }
            };

            if !self.retry.allows_retry(retries_done) {
                let reason = format!("gave up after {attempt} attempts: {error}");
                warn!(execution_id = %execution_id, side = %side, reason = %reason, "Leg failed");
                exec.leg_mut(side).mark_rejected(reason.clone());
                return LegOutcome::Failed(reason);
            }

            exec.leg_mut(side).note_error(error.clone());
            retries_done += 1;
            warn!(
                execution_id = %execution_id,
                side = %side,
                attempt,
                retry = retries_done,
                max_retries = self.retry.max_retries,
                error = %error,
                "Transient failure, retrying"
            );
            self.retry.wait(retries_done).await;
        }
    }

    /// Wait for a placed order to fill, cancelling it at the deadline.
    async fn await_fill(
        &self,
        request: &OrderRequest,
        handle: OrderHandle,
        abort: Option<&AbortHandle>,
    ) -> FillOutcome {
        let limit = request.price.unwrap_or_default();
        match handle.status {
            OrderStatus::Filled => return FillOutcome::Filled(handle.fill_price.unwrap_or(limit)),
            OrderStatus::Rejected => {
                return FillOutcome::Rejected("order rejected after placement".to_string())
            }
            OrderStatus::Cancelled => return FillOutcome::Unfilled,
            OrderStatus::Open => {}
        }

        let exchange = &request.exchange;
        let order_id = handle.order_id;
        let deadline = Instant::now() + self.settings.fill_timeout;

        loop {
            if abort.is_some_and(AbortHandle::is_requested) {
                return match self.cancel_or_fill(exchange, &order_id, limit).await {
                    CancelOutcome::Filled(price) => FillOutcome::Filled(price),
                    CancelOutcome::Cancelled => FillOutcome::Aborted,
                    CancelOutcome::Unconfirmed => FillOutcome::Unconfirmed,
                };
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(self.settings.fill_poll_interval.min(deadline - now)).await;

            match timeout(
                self.settings.order_timeout,
                self.gateway.order_status(exchange, &order_id),
            )
            .await
            {
                Ok(Ok(status)) => match status.status {
                    OrderStatus::Filled => {
                        return FillOutcome::Filled(status.fill_price.unwrap_or(limit))
                    }
                    OrderStatus::Rejected => {
                        return FillOutcome::Rejected(format!("order {order_id} rejected"))
                    }
                    OrderStatus::Cancelled => return FillOutcome::Unfilled,
                    OrderStatus::Open => {}
                },
                Ok(Err(e)) => debug!(order_id = %order_id, error = %e, "Status poll failed"),
                Err(_) => debug!(order_id = %order_id, "Status poll timed out"),
            }
        }

        debug!(order_id = %order_id, exchange = %exchange, "Fill deadline passed, cancelling");
        match self.cancel_or_fill(exchange, &order_id, limit).await {
            CancelOutcome::Filled(price) => FillOutcome::Filled(price),
            CancelOutcome::Cancelled => FillOutcome::Unfilled,
            CancelOutcome::Unconfirmed => FillOutcome::Unconfirmed,
        }
    }

    /// Cancel an open order. If the cancel does not go through, the order
    /// may have filled in the meantime, or been closed by the exchange. Only
    /// a status that shows it is no longer open counts as resolved.
    async fn cancel_or_fill(
        &self,
        exchange: &ExchangeId,
        order_id: &OrderId,
        limit: Price,
    ) -> CancelOutcome {
        let cancelled = timeout(
            self.settings.order_timeout,
            self.gateway.cancel_order(exchange, order_id),
        )
        .await;
        if matches!(cancelled, Ok(Ok(true))) {
            return CancelOutcome::Cancelled;
        }

        match timeout(
            self.settings.order_timeout,
            self.gateway.order_status(exchange, order_id),
        )
        .await
        {
            Ok(Ok(status)) => match status.status {
                OrderStatus::Filled => CancelOutcome::Filled(status.fill_price.unwrap_or(limit)),
                OrderStatus::Cancelled | OrderStatus::Rejected => CancelOutcome::Cancelled,
                OrderStatus::Open => {
                    warn!(order_id = %order_id, exchange = %exchange, "Order still open after cancel");
                    CancelOutcome::Unconfirmed
                }
            },
            _ => {
                warn!(order_id = %order_id, exchange = %exchange, "Could not confirm order cancellation");
                CancelOutcome::Unconfirmed
            }
        }
    }

    async fn place(&self, request: &OrderRequest) -> std::result::Result<OrderHandle, GatewayError> {
        match timeout(self.settings.order_timeout, self.gateway.place_order(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout {
                exchange: request.exchange.clone(),
                after_ms: saturating_millis(self.settings.order_timeout),
            }),
        }
    }

    fn check_slippage(&self, exec: &mut ArbitrageExecution, side: Side, fill_price: Price) {
        let expected = exec.leg(side).limit_price();
        if let Some(violation) = self.gate.slippage_ok(expected, fill_price).rejection_error() {
            warn!(
                execution_id = %exec.id(),
                side = %side,
                error = %violation,
                "Slippage exceeded"
            );
            exec.record_slippage(side, violation.clone());
        }
    }

    fn abort_execution(&self, mut exec: ArbitrageExecution, reason: &str) -> Result<ArbitrageExecution> {
        info!(execution_id = %exec.id(), reason = %reason, "Execution aborted");
        exec.finish(
            ExecutionState::Aborted,
            Some(ExecutionFailure::Cancelled {
                reason: reason.to_string(),
            }),
            self.clock.now(),
        )?;
        Ok(self.complete(exec))
    }

    fn left_open(exec: &ArbitrageExecution, side: Side, order_id: OrderId) -> ExecutionFailure {
        ExecutionFailure::OrderLeftOpen {
            side,
            exchange: exec.leg(side).exchange().clone(),
            order_id,
        }
    }

    fn fail_partial(
        &self,
        mut exec: ArbitrageExecution,
        failure: ExecutionFailure,
    ) -> Result<ArbitrageExecution> {
        error!(
            execution_id = %exec.id(),
            buy_exchange = %exec.buy_leg().exchange(),
            buy_fill = ?exec.buy_leg().fill_price(),
            sell_exchange = %exec.sell_leg().exchange(),
            reason = %failure,
            "Partial execution: buy filled, sell failed"
        );
        exec.finish(ExecutionState::FailedPartial, Some(failure), self.clock.now())?;
        self.write_audit(&exec);
        self.notifier
            .notify(Event::PartialFailure(PartialFailureEvent::from(&exec)));
        Ok(exec)
    }

    /// Audit and announce a terminal execution.
    fn complete(&self, exec: ArbitrageExecution) -> ArbitrageExecution {
        self.write_audit(&exec);
        self.notifier
            .notify(Event::ExecutionCompleted(ExecutionEvent::from(&exec)));
        exec
    }

    fn write_audit(&self, exec: &ArbitrageExecution) {
        let written = AuditRecord::from_execution(exec)
            .map_err(crate::error::Error::from)
            .and_then(|record| self.audit.record(&record));
        if let Err(e) = written {
            error!(execution_id = %exec.id(), error = %e, "Failed to write audit record");
        }
    }
}
