//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, the exchange registry, and runtime wiring.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`exchange`] - Known exchanges and connector routing

pub mod bootstrap;
pub mod config;
pub mod exchange;
