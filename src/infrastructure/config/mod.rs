//! Infrastructure configuration modules.

pub mod arbitrage;
pub mod exchange;
pub mod execution;
pub mod logging;
pub mod market;
pub mod risk;
pub mod settings;
