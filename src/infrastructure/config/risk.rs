//! Risk management configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::RiskPolicy;

/// `[risk]` section. Percent values are on a 0-100 scale.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    /// Minimum fee-adjusted profit to report an opportunity.
    #[serde(default = "default_min_profit_percent")]
    pub min_profit_percent: Decimal,
    /// Largest trade size in base asset units.
    #[serde(default = "default_max_order_size")]
    pub max_order_size: Decimal,
    /// Largest trade size as a share of portfolio value.
    #[serde(default = "default_max_exposure_percent")]
    pub max_exposure_percent: Decimal,
    #[serde(default = "default_stop_loss_percent")]
    pub stop_loss_percent: Decimal,
    #[serde(default = "default_max_slippage_percent")]
    pub max_slippage_percent: Decimal,
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: f64,
    #[serde(default = "default_high_volatility_threshold")]
    pub high_volatility_threshold: Decimal,
    #[serde(default = "default_low_liquidity_threshold")]
    pub low_liquidity_threshold: Decimal,
    /// Retries per leg after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_seconds")]
    pub retry_backoff_seconds: f64,
    /// Time allowed for moving funds from the buy to the sell exchange.
    #[serde(default = "default_max_transfer_seconds")]
    pub max_transfer_seconds: f64,
}

fn default_min_profit_percent() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

fn default_max_order_size() -> Decimal {
    Decimal::from(10)
}

fn default_max_exposure_percent() -> Decimal {
    Decimal::from(50)
}

fn default_stop_loss_percent() -> Decimal {
    Decimal::from(2)
}

fn default_max_slippage_percent() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

const fn default_cooldown_seconds() -> f64 {
    5.0
}

fn default_high_volatility_threshold() -> Decimal {
    Decimal::from(5)
}

fn default_low_liquidity_threshold() -> Decimal {
    Decimal::from(5000)
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_retry_backoff_seconds() -> f64 {
    2.0
}

const fn default_max_transfer_seconds() -> f64 {
    30.0
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            min_profit_percent: default_min_profit_percent(),
            max_order_size: default_max_order_size(),
            max_exposure_percent: default_max_exposure_percent(),
            stop_loss_percent: default_stop_loss_percent(),
            max_slippage_percent: default_max_slippage_percent(),
            cooldown_seconds: default_cooldown_seconds(),
            high_volatility_threshold: default_high_volatility_threshold(),
            low_liquidity_threshold: default_low_liquidity_threshold(),
            max_retries: default_max_retries(),
            retry_backoff_seconds: default_retry_backoff_seconds(),
            max_transfer_seconds: default_max_transfer_seconds(),
        }
    }
}

impl From<RiskConfig> for RiskPolicy {
    fn from(config: RiskConfig) -> Self {
        Self {
            max_order_size: config.max_order_size,
            max_exposure_percent: config.max_exposure_percent,
            min_profit_percent: config.min_profit_percent,
            stop_loss_percent: config.stop_loss_percent,
            max_slippage_percent: config.max_slippage_percent,
            cooldown_seconds: config.cooldown_seconds,
            high_volatility_threshold: config.high_volatility_threshold,
            low_liquidity_threshold: config.low_liquidity_threshold,
            max_retries: config.max_retries,
            retry_backoff_seconds: config.retry_backoff_seconds,
            max_transfer_seconds: config.max_transfer_seconds,
        }
    }
}
