//! Outbound adapters (driven side).

pub mod audit;
pub mod conditions;
pub mod notifier;
pub mod paper;
