//! Domain validation errors for core domain types.
//!
//! These errors are returned when a constructor or a state transition would
//! violate a domain invariant.
//!
//! # Examples
//!
//! ```
//! use crossarb::domain::error::DomainError;
//! use crossarb::domain::{ExchangeId, PriceSnapshot, Symbol};
//! use chrono::Utc;
//! use rust_decimal_macros::dec;
//!
//! let mut snapshot = PriceSnapshot::new(Symbol::from("BTC/USDT"), Utc::now());
//! let result = snapshot.insert(ExchangeId::from("binance"), dec!(0), Utc::now());
//!
//! assert!(matches!(result, Err(DomainError::NonPositivePrice { .. })));
//! ```

use thiserror::Error;

use super::execution::ExecutionState;
use super::id::ExchangeId;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Prices must be strictly positive.
    #[error("price must be positive, got {price}")]
    NonPositivePrice {
        /// The invalid price that was provided.
        price: rust_decimal::Decimal,
    },

    /// Trade sizes must be strictly positive.
    #[error("volume must be positive, got {volume}")]
    NonPositiveVolume {
        /// The invalid volume that was provided.
        volume: rust_decimal::Decimal,
    },

    /// Both legs of an arbitrage must trade on different exchanges.
    #[error("buy and sell exchange must differ, both are {exchange}")]
    SameExchange {
        /// The exchange used for both legs.
        exchange: ExchangeId,
    },

    /// The execution state machine refused a transition.
    #[error("invalid execution transition: {from} -> {to}")]
    InvalidTransition {
        /// State the execution was in.
        from: ExecutionState,
        /// State that was requested.
        to: ExecutionState,
    },

    /// An audit record was requested for an execution still in flight.
    #[error("execution is not terminal, current state is {state}")]
    NotTerminal {
        /// State the execution is in.
        state: ExecutionState,
    },
}
