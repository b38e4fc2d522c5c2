//! crossarb - Fee-adjusted cross-exchange arbitrage detection and execution.
//!
//! The crate watches one symbol across several exchanges, finds the pair of
//! exchanges whose price gap survives trading and withdrawal fees, and runs
//! the resulting two-leg trade through a risk-gated state machine.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Snapshots, fees, opportunities and the execution state machine
//! - [`port`] - Traits the application depends on (exchanges, notifier, audit, clock)
//! - [`application`] - Detector, risk gate, execution coordinator and pool, engine
//! - [`adapter`] - Paper exchange, audit log, log notifier, and the CLI
//! - [`infrastructure`] - Configuration, exchange registry, runtime wiring
//!
//! # Example
//!
//! ```
//! use crossarb::application::detector::{ArbitrageDetector, DetectionMode};
//! use crossarb::domain::{FeeSchedule, PriceSnapshot, RiskPolicy, Symbol};
//! use rust_decimal::Decimal;
//!
//! let snapshot = PriceSnapshot::new(Symbol::from("BTC/USDT"), chrono::Utc::now())
//!     .with_quote("a", Decimal::from(100)).unwrap()
//!     .with_quote("b", Decimal::from(105)).unwrap();
//! let detector = ArbitrageDetector::new(DetectionMode::Pairwise);
//! let opportunity = detector
//!     .detect(&snapshot, &FeeSchedule::new(), &RiskPolicy::default())
//!     .unwrap();
//! assert_eq!(opportunity.buy_exchange().as_str(), "a");
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
