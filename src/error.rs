use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::id::ExchangeId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown exchange: {name}")]
    UnknownExchange { name: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors returned by an exchange when placing, cancelling or querying orders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("network error on {exchange}: {reason}")]
    Network { exchange: ExchangeId, reason: String },

    #[error("{exchange} rejected the order: {reason}")]
    ExchangeRejected { exchange: ExchangeId, reason: String },

    #[error("rate limited by {exchange}")]
    RateLimited { exchange: ExchangeId },

    #[error("{exchange} did not answer within {after_ms}ms")]
    Timeout { exchange: ExchangeId, after_ms: u64 },

    #[error("order {order_id} not found on {exchange}")]
    OrderNotFound { exchange: ExchangeId, order_id: String },

    #[error("no connector registered for {exchange}")]
    UnknownExchange { exchange: ExchangeId },
}

impl GatewayError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::RateLimited { .. } | Self::Timeout { .. }
        )
    }

    /// Exchange the error came from.
    #[must_use]
    pub fn exchange(&self) -> &ExchangeId {
        match self {
            Self::Network { exchange, .. }
            | Self::ExchangeRejected { exchange, .. }
            | Self::RateLimited { exchange }
            | Self::Timeout { exchange, .. }
            | Self::OrderNotFound { exchange, .. }
            | Self::UnknownExchange { exchange } => exchange,
        }
    }
}

/// Risk management errors, one per failing check.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RiskError {
    #[error("order size {size} exceeds maximum {max}")]
    OrderSizeExceeded { size: Decimal, max: Decimal },

    #[error("order size {size} exceeds exposure limit {limit}")]
    ExposureExceeded { size: Decimal, limit: Decimal },

    #[error("cooldown active: {elapsed_ms}ms elapsed of {cooldown_ms}ms")]
    CooldownActive { elapsed_ms: i64, cooldown_ms: i64 },

    #[error("volatility {volatility} above threshold {threshold}")]
    HighVolatility { volatility: Decimal, threshold: Decimal },

    #[error("liquidity depth {depth} below threshold {threshold}")]
    LowLiquidity { depth: Decimal, threshold: Decimal },

    #[error("slippage {slippage_percent}% exceeds {max}% (expected {expected}, got {actual})")]
    SlippageExceeded {
        expected: Decimal,
        actual: Decimal,
        slippage_percent: Decimal,
        max: Decimal,
    },

    #[error("market conditions unavailable: {reason}")]
    MarketDataUnavailable { reason: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error("exchange {exchange} unavailable: {reason}")]
    ExchangeUnavailable { exchange: ExchangeId, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_gateway_errors() {
        let ex = ExchangeId::from("kraken");
        assert!(GatewayError::Network {
            exchange: ex.clone(),
            reason: "reset".into()
        }
        .is_transient());
        assert!(GatewayError::RateLimited {
            exchange: ex.clone()
        }
        .is_transient());
        assert!(GatewayError::Timeout {
            exchange: ex.clone(),
            after_ms: 100
        }
        .is_transient());
        assert!(!GatewayError::ExchangeRejected {
            exchange: ex.clone(),
            reason: "insufficient balance".into()
        }
        .is_transient());
        assert!(!GatewayError::UnknownExchange { exchange: ex }.is_transient());
    }

    #[test]
    fn config_error_wraps_into_error() {
        let err: Error = ConfigError::MissingField { field: "symbols" }.into();
        assert_eq!(err.to_string(), "missing required field: symbols");
    }

    #[test]
    fn risk_error_serializes_with_check_tag() {
        let err = RiskError::CooldownActive {
            elapsed_ms: 1000,
            cooldown_ms: 5000,
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"check\":\"cooldown_active\""));
    }
}
