//! Immutable audit record of a finished execution.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;
use super::execution::{ArbitrageExecution, ExecutionFailure, ExecutionState};
use super::money::Volume;
use super::opportunity::ArbitrageOpportunity;
use super::trade::TradeLeg;
use crate::error::RiskError;

/// Serialisable snapshot of an execution in a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub execution_id: Uuid,
    pub state: ExecutionState,
    pub opportunity: ArbitrageOpportunity,
    pub trade_size: Volume,
    pub buy_leg: TradeLeg,
    pub sell_leg: TradeLeg,
    pub attempt_count: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub failure: Option<ExecutionFailure>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slippage_violations: Vec<RiskError>,
    /// `(sell fill - buy fill) * size`, present only when both legs filled.
    pub realized_pnl: Option<Decimal>,
}

impl AuditRecord {
    /// Capture a terminal execution.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotTerminal`] if the execution is still running.
    pub fn from_execution(execution: &ArbitrageExecution) -> Result<Self, DomainError> {
        let finished_at = match execution.finished_at() {
            Some(at) if execution.is_terminal() => at,
            _ => {
                return Err(DomainError::NotTerminal {
                    state: execution.state(),
                })
            }
        };

        let realized_pnl = execution
            .buy_leg()
            .fill_price()
            .zip(execution.sell_leg().fill_price())
            .and_then(|(buy, sell)| (sell - buy).checked_mul(execution.trade_size()));

        Ok(Self {
            execution_id: execution.id(),
            state: execution.state(),
            opportunity: execution.opportunity().clone(),
            trade_size: execution.trade_size(),
            buy_leg: execution.buy_leg().clone(),
            sell_leg: execution.sell_leg().clone(),
            attempt_count: execution.attempt_count(),
            started_at: execution.started_at(),
            finished_at,
            failure: execution.failure().cloned(),
            slippage_violations: execution.slippage_violations().to_vec(),
            realized_pnl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::{ExchangeId, OrderId, Symbol};
    use crate::domain::trade::Side;
    use rust_decimal_macros::dec;

    fn execution() -> ArbitrageExecution {
        let opp = ArbitrageOpportunity::builder()
            .symbol(Symbol::from("ETH/USDT"))
            .buy(ExchangeId::from("kraken"), dec!(2000))
            .sell(ExchangeId::from("okx"), dec!(2050))
            .net_profit_percent(dec!(2))
            .detected_at(Utc::now())
            .build()
            .unwrap();
        ArbitrageExecution::new(opp, dec!(2), Utc::now()).unwrap()
    }

    #[test]
    fn refuses_running_execution() {
        let mut exec = execution();
        exec.transition(ExecutionState::BuyPending).unwrap();
        let err = AuditRecord::from_execution(&exec).unwrap_err();
        assert_eq!(
            err,
            DomainError::NotTerminal {
                state: ExecutionState::BuyPending
            }
        );
    }

    #[test]
    fn completed_execution_reports_pnl() {
        let mut exec = execution();
        exec.transition(ExecutionState::BuyPending).unwrap();
        exec.record_attempt(Side::Buy);
        exec.leg_mut(Side::Buy).mark_placed(OrderId::from("b-1"));
        exec.leg_mut(Side::Buy).mark_filled(dec!(2001));
        exec.transition(ExecutionState::BuyFilled).unwrap();
        exec.transition(ExecutionState::Transferring).unwrap();
        exec.transition(ExecutionState::SellPending).unwrap();
        exec.record_attempt(Side::Sell);
        exec.leg_mut(Side::Sell).mark_placed(OrderId::from("s-1"));
        exec.leg_mut(Side::Sell).mark_filled(dec!(2049));
        exec.finish(ExecutionState::Completed, None, Utc::now())
            .unwrap();

        let record = AuditRecord::from_execution(&exec).unwrap();
        assert_eq!(record.state, ExecutionState::Completed);
        assert_eq!(record.attempt_count, 2);
        assert_eq!(record.realized_pnl, Some(dec!(96)));
    }

    #[test]
    fn serializes_as_single_json_line() {
        let mut exec = execution();
        exec.finish(
            ExecutionState::Aborted,
            Some(ExecutionFailure::Cancelled {
                reason: "operator".into(),
            }),
            Utc::now(),
        )
        .unwrap();

        let record = AuditRecord::from_execution(&exec).unwrap();
        let line = serde_json::to_string(&record).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"state\":\"aborted\""));

        let back: AuditRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back, record);
    }
}
