//! Notifier port for event notifications.
//!
//! Events cover the life of an opportunity: detection, risk rejection,
//! completion, and the partial failure that leaves a position open.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{ArbitrageExecution, ArbitrageOpportunity, ExecutionState, TradeLeg};
use crate::error::RiskError;

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// Arbitrage opportunity detected.
    OpportunityDetected(OpportunityEvent),
    /// Risk check rejected a trade before any order.
    RiskRejected(RiskEvent),
    /// Execution reached a terminal state other than a partial failure.
    ExecutionCompleted(ExecutionEvent),
    /// Buy leg filled, sell leg did not.
    PartialFailure(PartialFailureEvent),
}

/// Opportunity detection event.
#[derive(Debug, Clone)]
pub struct OpportunityEvent {
    pub symbol: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    /// Fee-adjusted profit percent.
    pub net_profit_percent: Decimal,
}

impl From<&ArbitrageOpportunity> for OpportunityEvent {
    fn from(opp: &ArbitrageOpportunity) -> Self {
        Self {
            symbol: opp.symbol().to_string(),
            buy_exchange: opp.buy_exchange().to_string(),
            sell_exchange: opp.sell_exchange().to_string(),
            buy_price: opp.buy_price(),
            sell_price: opp.sell_price(),
            net_profit_percent: opp.net_profit_percent(),
        }
    }
}

/// Risk rejection event.
#[derive(Debug, Clone)]
pub struct RiskEvent {
    pub execution_id: Uuid,
    pub symbol: String,
    /// The failing check.
    pub error: RiskError,
}

impl RiskEvent {
    /// Create a risk event for an execution.
    #[must_use]
    pub fn new(execution: &ArbitrageExecution, error: &RiskError) -> Self {
        Self {
            execution_id: execution.id(),
            symbol: execution.opportunity().symbol().to_string(),
            error: error.clone(),
        }
    }
}

/// Terminal execution event.
#[derive(Debug, Clone)]
pub struct ExecutionEvent {
    pub execution_id: Uuid,
    pub symbol: String,
    pub state: ExecutionState,
    /// Whether both legs filled.
    pub success: bool,
    pub attempts: u32,
    /// Failure description, if any.
    pub details: Option<String>,
}

impl From<&ArbitrageExecution> for ExecutionEvent {
    fn from(execution: &ArbitrageExecution) -> Self {
        Self {
            execution_id: execution.id(),
            symbol: execution.opportunity().symbol().to_string(),
            state: execution.state(),
            success: execution.state() == ExecutionState::Completed,
            attempts: execution.attempt_count(),
            details: execution.failure().map(ToString::to_string),
        }
    }
}

/// Partial failure event carrying both legs.
#[derive(Debug, Clone)]
pub struct PartialFailureEvent {
    pub execution_id: Uuid,
    pub symbol: String,
    pub buy_leg: TradeLeg,
    pub sell_leg: TradeLeg,
    pub reason: String,
}

impl From<&ArbitrageExecution> for PartialFailureEvent {
    fn from(execution: &ArbitrageExecution) -> Self {
        Self {
            execution_id: execution.id(),
            symbol: execution.opportunity().symbol().to_string(),
            buy_leg: execution.buy_leg().clone(),
            sell_leg: execution.sell_leg().clone(),
            reason: execution
                .failure()
                .map_or_else(|| "unknown".to_string(), ToString::to_string),
        }
    }
}

/// Trait for notification handlers.
///
/// Notifications are fire-and-forget. Implementations must return quickly
/// and spawn a task for anything slow.
pub trait Notifier: Send + Sync {
    /// Handle an event.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for NotifierRegistry {
    fn notify(&self, event: Event) {
        self.notify_all(event);
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}
