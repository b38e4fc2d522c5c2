//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for various notification backends.

use tracing::{error, info, warn};

use crate::port::outbound::notifier::{Event, Notifier};

/// Writes every event to the tracing subscriber.
///
/// Partial failures are logged at `error` level since they leave an open
/// position behind.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        match event {
            Event::OpportunityDetected(e) => info!(
                symbol = %e.symbol,
                buy_exchange = %e.buy_exchange,
                sell_exchange = %e.sell_exchange,
                buy_price = %e.buy_price,
                sell_price = %e.sell_price,
                net_profit_percent = %e.net_profit_percent,
                "Opportunity detected"
            ),
            Event::RiskRejected(e) => warn!(
                execution_id = %e.execution_id,
                symbol = %e.symbol,
                check = %e.error,
                "Risk rejected"
            ),
            Event::ExecutionCompleted(e) => info!(
                execution_id = %e.execution_id,
                symbol = %e.symbol,
                state = %e.state,
                success = e.success,
                attempts = e.attempts,
                details = e.details.as_deref().unwrap_or(""),
                "Execution finished"
            ),
            Event::PartialFailure(e) => error!(
                execution_id = %e.execution_id,
                symbol = %e.symbol,
                buy_exchange = %e.buy_leg.exchange(),
                buy_order = ?e.buy_leg.order_id(),
                sell_exchange = %e.sell_leg.exchange(),
                reason = %e.reason,
                "Partial failure, open position requires attention"
            ),
        }
    }
}
