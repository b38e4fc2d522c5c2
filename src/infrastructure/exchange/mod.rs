//! Exchange registry.
//!
//! ## Adding a New Exchange
//!
//! 1. Add a variant to [`ExchangeKind`] with its configuration name
//! 2. Implement [`crate::port::outbound::exchange::ExchangeConnector`]
//! 3. Construct it in [`ExchangeRegistry::from_config`]

mod registry;

pub use registry::{ExchangeKind, ExchangeRegistry};
