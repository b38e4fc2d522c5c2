//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies such as exchanges,
//! market data, notifications, audit persistence and time.

pub mod audit;
pub mod clock;
pub mod exchange;
pub mod market;
pub mod notifier;
