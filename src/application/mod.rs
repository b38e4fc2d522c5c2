//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod detector;
pub mod engine;
pub mod execution;
pub mod oracle;
pub mod risk;

pub use detector::{ArbitrageDetector, DetectionMode, DetectionOutcome};
pub use engine::{ArbitrageEngine, CycleOutcome, EngineSettings, ScanReport};
pub use oracle::ConnectorOracle;
