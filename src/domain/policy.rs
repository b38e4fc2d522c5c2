//! Risk policy shared by detection, gating and execution.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{Percent, Volume};

/// Immutable risk limits, loaded once from configuration and shared via `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Largest allowed trade size, in base asset units.
    pub max_order_size: Volume,
    /// Largest trade size as a percentage of portfolio value.
    pub max_exposure_percent: Percent,
    /// Minimum fee-adjusted profit for an opportunity to be reported.
    pub min_profit_percent: Percent,
    /// Drawdown from entry that triggers a stop loss.
    pub stop_loss_percent: Percent,
    /// Largest tolerated difference between expected and fill price.
    pub max_slippage_percent: Percent,
    /// Minimum time between two executions in the same cooldown scope.
    pub cooldown_seconds: f64,
    /// Volatility above which trading is refused.
    pub high_volatility_threshold: Percent,
    /// Order book depth below which trading is refused.
    pub low_liquidity_threshold: Decimal,
    /// Retries allowed per leg after the first attempt.
    pub max_retries: u32,
    /// Delay between retries.
    pub retry_backoff_seconds: f64,
    /// Time allowed for moving funds between exchanges.
    pub max_transfer_seconds: f64,
}

impl RiskPolicy {
    /// Cooldown window as a [`Duration`].
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        secs(self.cooldown_seconds)
    }

    /// Retry backoff as a [`Duration`].
    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        secs(self.retry_backoff_seconds)
    }

    /// Transfer allowance as a [`Duration`].
    #[must_use]
    pub fn max_transfer(&self) -> Duration {
        secs(self.max_transfer_seconds)
    }
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            max_order_size: Decimal::from(10),
            max_exposure_percent: Decimal::from(50),
            min_profit_percent: Decimal::new(5, 1),
            stop_loss_percent: Decimal::from(2),
            max_slippage_percent: Decimal::new(5, 1),
            cooldown_seconds: 5.0,
            high_volatility_threshold: Decimal::from(5),
            low_liquidity_threshold: Decimal::from(5000),
            max_retries: 3,
            retry_backoff_seconds: 2.0,
            max_transfer_seconds: 30.0,
        }
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
#[must_use]
pub fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_follow_seconds() {
        let policy = RiskPolicy {
            cooldown_seconds: 1.5,
            retry_backoff_seconds: 0.25,
            ..RiskPolicy::default()
        };
        assert_eq!(policy.cooldown(), Duration::from_millis(1500));
        assert_eq!(policy.retry_backoff(), Duration::from_millis(250));
    }

    #[test]
    fn millis_saturate_instead_of_truncating() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn negative_seconds_clamp_to_zero() {
        let policy = RiskPolicy {
            max_transfer_seconds: -3.0,
            ..RiskPolicy::default()
        };
        assert_eq!(policy.max_transfer(), Duration::ZERO);
    }
}
