//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`gateway`] - `ScriptedGateway`, an [`OrderGateway`](crate::port::outbound::exchange::OrderGateway)
//!   whose responses are queued per exchange and whose calls are counted.
//! - [`market`] - `StaticOracle` and `FixedConditions` for prices and market facts.
//! - [`clock`] - `ManualClock`, a settable [`Clock`](crate::port::outbound::clock::Clock).
//! - [`notifier`] - `RecordingNotifier`, which keeps every event.
//! - [`domain`] - Builders for ids, snapshots, opportunities and policies.

pub mod clock;
pub mod domain;
pub mod gateway;
pub mod market;
pub mod notifier;
