//! Exchange-agnostic domain types: snapshots, fees, opportunities and the
//! execution state machine.

pub mod audit;
pub mod error;
pub mod execution;
pub mod fee;
pub mod id;
pub mod money;
pub mod opportunity;
pub mod policy;
pub mod snapshot;
pub mod trade;

pub use audit::AuditRecord;
pub use execution::{ArbitrageExecution, ExecutionFailure, ExecutionState};
pub use fee::{ExchangeFees, FeeSchedule};
pub use id::{ExchangeId, OrderId, Symbol};
pub use money::{Percent, Price, Volume};
pub use opportunity::{ArbitrageOpportunity, OpportunityBuildError, OpportunityBuilder};
pub use policy::RiskPolicy;
pub use snapshot::{PriceSnapshot, Quote};
pub use trade::{LegStatus, Side, TradeLeg};
