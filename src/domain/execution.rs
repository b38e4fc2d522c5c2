//! Two-leg execution state machine.
//!
//! ```text
//! Initiated -> BuyPending -> BuyFilled -> Transferring -> SellPending -> Completed
//!     |            |                                          |
//!     |            +--> Aborted                               +--> FailedPartial
//!     +--> Aborted
//!     +--> RiskRejected
//! ```
//!
//! Terminal states never transition again.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::error::DomainError;
use super::id::{ExchangeId, OrderId};
use super::money::Volume;
use super::opportunity::ArbitrageOpportunity;
use super::trade::{Side, TradeLeg};
use crate::error::RiskError;

/// State of an arbitrage execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Initiated,
    BuyPending,
    BuyFilled,
    Transferring,
    SellPending,
    Completed,
    Aborted,
    FailedPartial,
    RiskRejected,
}

impl ExecutionState {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Aborted | Self::FailedPartial | Self::RiskRejected
        )
    }

    /// Whether an abort request can still stop the execution safely.
    #[must_use]
    pub const fn is_abortable(self) -> bool {
        matches!(self, Self::Initiated | Self::BuyPending)
    }

    /// Whether `self -> next` is an edge of the state machine.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use ExecutionState::*;
        matches!(
            (self, next),
            (Initiated, BuyPending)
                | (Initiated, Aborted)
                | (Initiated, RiskRejected)
                | (BuyPending, BuyFilled)
                | (BuyPending, Aborted)
                | (BuyFilled, Transferring)
                | (Transferring, SellPending)
                | (SellPending, Completed)
                | (SellPending, FailedPartial)
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::BuyPending => "buy_pending",
            Self::BuyFilled => "buy_filled",
            Self::Transferring => "transferring",
            Self::SellPending => "sell_pending",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::FailedPartial => "failed_partial",
            Self::RiskRejected => "risk_rejected",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an execution did not complete.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionFailure {
    /// A risk check refused the trade; no order was placed.
    #[error("risk rejected: {error}")]
    RiskRejected { error: RiskError },

    /// The buy leg never filled; nothing is held.
    #[error("buy leg failed: {reason}")]
    BuyLegFailed { reason: String },

    /// Aborted on request before the buy filled.
    #[error("aborted: {reason}")]
    Cancelled { reason: String },

    /// The buy leg filled but the sell leg could not complete.
    #[error("partial execution, sell leg failed: {reason}")]
    PartialExecution { reason: String },

    /// A cancel was never confirmed; the order may still be live.
    #[error("{side} order {order_id} on {exchange} may still be open: cancel unconfirmed")]
    OrderLeftOpen {
        side: Side,
        exchange: ExchangeId,
        order_id: OrderId,
    },
}

/// One attempt to trade an opportunity, owning both of its legs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageExecution {
    id: Uuid,
    opportunity: ArbitrageOpportunity,
    trade_size: Volume,
    buy_leg: TradeLeg,
    sell_leg: TradeLeg,
    state: ExecutionState,
    attempt_count: u32,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    failure: Option<ExecutionFailure>,
    slippage_violations: Vec<RiskError>,
}

impl ArbitrageExecution {
    /// Start a new execution in [`ExecutionState::Initiated`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositiveVolume`] for a zero or negative size.
    pub fn new(
        opportunity: ArbitrageOpportunity,
        trade_size: Volume,
        started_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if trade_size <= Volume::ZERO {
            return Err(DomainError::NonPositiveVolume { volume: trade_size });
        }

        let buy_leg = TradeLeg::new(
            opportunity.buy_exchange().clone(),
            opportunity.symbol().clone(),
            Side::Buy,
            trade_size,
            opportunity.buy_price(),
        );
        let sell_leg = TradeLeg::new(
            opportunity.sell_exchange().clone(),
            opportunity.symbol().clone(),
            Side::Sell,
            trade_size,
            opportunity.sell_price(),
        );

        Ok(Self {
            id: Uuid::new_v4(),
            opportunity,
            trade_size,
            buy_leg,
            sell_leg,
            state: ExecutionState::Initiated,
            attempt_count: 0,
            started_at,
            finished_at: None,
            failure: None,
            slippage_violations: Vec::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn opportunity(&self) -> &ArbitrageOpportunity {
        &self.opportunity
    }

    pub fn trade_size(&self) -> Volume {
        self.trade_size
    }

    pub fn buy_leg(&self) -> &TradeLeg {
        &self.buy_leg
    }

    pub fn sell_leg(&self) -> &TradeLeg {
        &self.sell_leg
    }

    /// The leg for a given side.
    pub fn leg(&self, side: Side) -> &TradeLeg {
        match side {
            Side::Buy => &self.buy_leg,
            Side::Sell => &self.sell_leg,
        }
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Total placement attempts across both legs.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn failure(&self) -> Option<&ExecutionFailure> {
        self.failure.as_ref()
    }

    /// Slippage checks that failed on either leg.
    pub fn slippage_violations(&self) -> &[RiskError] {
        &self.slippage_violations
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub(crate) fn leg_mut(&mut self, side: Side) -> &mut TradeLeg {
        match side {
            Side::Buy => &mut self.buy_leg,
            Side::Sell => &mut self.sell_leg,
        }
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] if `next` is not reachable
    /// from the current state, which includes every transition out of a
    /// terminal state.
    pub fn transition(&mut self, next: ExecutionState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Count one placement attempt on a leg, returning that leg's total.
    pub fn record_attempt(&mut self, side: Side) -> u32 {
        self.attempt_count += 1;
        self.leg_mut(side).record_attempt()
    }

    /// Flag a leg whose fill deviated beyond the slippage limit.
    pub fn record_slippage(&mut self, side: Side, violation: RiskError) {
        self.leg_mut(side).flag_slippage();
        self.slippage_violations.push(violation);
    }

    /// Enter a terminal state, stamping the finish time.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] if `terminal` is not a legal
    /// next state.
    pub fn finish(
        &mut self,
        terminal: ExecutionState,
        failure: Option<ExecutionFailure>,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        debug_assert!(terminal.is_terminal());
        self.transition(terminal)?;
        self.failure = failure;
        self.finished_at = Some(at);
        Ok(())
    }
}
