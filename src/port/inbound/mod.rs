//! Inbound (driving) ports consumed by the engine and the CLI.
//!
//! - [`risk`]: Risk check result types for trade validation

pub mod risk;
