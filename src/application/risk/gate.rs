//! Risk predicates over the policy and runtime facts.
//!
//! Every check is side-effect free; state such as the last trade time is
//! passed in by the caller. The cooldown tracker is the only stateful piece
//! and lives in [`super::cooldown`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::{money::percent_of, Percent, Price, RiskPolicy, Volume};
use crate::error::RiskError;
use crate::port::inbound::risk::RiskCheckResult;

/// Composable risk checks backed by a shared [`RiskPolicy`].
#[derive(Debug, Clone)]
pub struct RiskGate {
    policy: Arc<RiskPolicy>,
}

impl RiskGate {
    /// Create a gate over the given policy.
    pub const fn new(policy: Arc<RiskPolicy>) -> Self {
        Self { policy }
    }

    /// The policy this gate enforces.
    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Check the trade size against the absolute and portfolio-relative caps.
    #[must_use]
    pub fn pre_trade(&self, size: Volume, portfolio_value: Decimal) -> RiskCheckResult {
        let max = self.policy.max_order_size;
        if size > max {
            warn!(size = %size, max = %max, "Order size exceeds maximum");
            return RiskCheckResult::Rejected(RiskError::OrderSizeExceeded { size, max });
        }

        let limit = (self.policy.max_exposure_percent / Decimal::ONE_HUNDRED)
            .checked_mul(portfolio_value)
            .unwrap_or(Decimal::MAX);
        if size > limit {
            warn!(
                size = %size,
                limit = %limit,
                portfolio_value = %portfolio_value,
                "Order size exceeds exposure limit"
            );
            return RiskCheckResult::Rejected(RiskError::ExposureExceeded { size, limit });
        }

        RiskCheckResult::Approved
    }

    /// Check that at least `cooldown_seconds` passed since the last trade.
    #[must_use]
    pub fn cooldown_ok(
        &self,
        last_trade_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> RiskCheckResult {
        let Some(last) = last_trade_time else {
            return RiskCheckResult::Approved;
        };

        let cooldown = Duration::from_std(self.policy.cooldown()).unwrap_or_else(|_| Duration::zero());
        let elapsed = now.signed_duration_since(last);
        if elapsed < cooldown {
            return RiskCheckResult::Rejected(RiskError::CooldownActive {
                elapsed_ms: elapsed.num_milliseconds(),
                cooldown_ms: cooldown.num_milliseconds(),
            });
        }

        RiskCheckResult::Approved
    }

    /// Refuse trading in volatile or thin markets.
    #[must_use]
    pub fn market_conditions_ok(
        &self,
        volatility: Percent,
        liquidity_depth: Decimal,
    ) -> RiskCheckResult {
        let threshold = self.policy.high_volatility_threshold;
        if volatility > threshold {
            warn!(volatility = %volatility, threshold = %threshold, "High market volatility");
            return RiskCheckResult::Rejected(RiskError::HighVolatility {
                volatility,
                threshold,
            });
        }

        let threshold = self.policy.low_liquidity_threshold;
        if liquidity_depth < threshold {
            warn!(depth = %liquidity_depth, threshold = %threshold, "Low market liquidity");
            return RiskCheckResult::Rejected(RiskError::LowLiquidity {
                depth: liquidity_depth,
                threshold,
            });
        }

        RiskCheckResult::Approved
    }

    /// Compare a fill against the expected price.
    #[must_use]
    pub fn slippage_ok(&self, expected: Price, actual: Price) -> RiskCheckResult {
        let max = self.policy.max_slippage_percent;
        // A non-positive expectation can never be matched, nor an overflowing one.
        let slippage_percent =
            percent_of((expected - actual).abs(), expected).unwrap_or(Decimal::ONE_HUNDRED);

        if slippage_percent > max {
            return RiskCheckResult::Rejected(RiskError::SlippageExceeded {
                expected,
                actual,
                slippage_percent,
                max,
            });
        }

        RiskCheckResult::Approved
    }

    /// Whether `current` has fallen `stop_loss_percent` or more below `entry`.
    #[must_use]
    pub fn stop_loss_triggered(&self, entry: Price, current: Price) -> bool {
        let factor = Decimal::ONE - self.policy.stop_loss_percent / Decimal::ONE_HUNDRED;
        match entry.checked_mul(factor) {
            Some(floor) => current <= floor,
            None => percent_of(entry - current, entry)
                .is_some_and(|drop| drop >= self.policy.stop_loss_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn gate() -> RiskGate {
        RiskGate::new(Arc::new(RiskPolicy::default()))
    }

    #[test]
    fn test_pre_trade_approved() {
        assert!(gate().pre_trade(dec!(5), dec!(100)).is_approved());
    }

    #[test]
    fn test_pre_trade_rejects_oversize_regardless_of_portfolio() {
        for portfolio in [dec!(0), dec!(100), dec!(1_000_000_000)] {
            let result = gate().pre_trade(dec!(10.01), portfolio);
            assert!(matches!(
                result.rejection_error(),
                Some(RiskError::OrderSizeExceeded { .. })
            ));
        }
    }

    #[test]
    fn test_pre_trade_rejects_exposure() {
        // 50% of 10 is 5.
        let result = gate().pre_trade(dec!(6), dec!(10));
        assert_eq!(
            result.rejection_error(),
            Some(&RiskError::ExposureExceeded {
                size: dec!(6),
                limit: dec!(5),
            })
        );
    }

    #[test]
    fn test_cooldown() {
        let gate = gate();
        let now = Utc::now();

        assert!(gate.cooldown_ok(None, now).is_approved());
        assert!(!gate
            .cooldown_ok(Some(now - Duration::seconds(4)), now)
            .is_approved());
        assert!(gate
            .cooldown_ok(Some(now - Duration::seconds(5)), now)
            .is_approved());
    }

    #[test]
    fn test_market_conditions() {
        let gate = gate();
        assert!(gate.market_conditions_ok(dec!(5), dec!(5000)).is_approved());
        assert!(matches!(
            gate.market_conditions_ok(dec!(5.1), dec!(10000)).rejection_error(),
            Some(RiskError::HighVolatility { .. })
        ));
        assert!(matches!(
            gate.market_conditions_ok(dec!(1), dec!(4999)).rejection_error(),
            Some(RiskError::LowLiquidity { .. })
        ));
    }

    #[test]
    fn test_slippage() {
        let gate = gate();
        assert!(gate.slippage_ok(dec!(100), dec!(100.5)).is_approved());
        assert!(gate.slippage_ok(dec!(100), dec!(99.5)).is_approved());

        let result = gate.slippage_ok(dec!(100), dec!(99.4));
        match result.rejection_error() {
            Some(RiskError::SlippageExceeded {
                slippage_percent, ..
            }) => assert_eq!(*slippage_percent, dec!(0.6)),
            other => panic!("expected slippage rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_extreme_values_do_not_panic() {
        let gate = gate();
        assert!(gate.pre_trade(dec!(5), Decimal::MAX).is_approved());
        assert!(!gate
            .slippage_ok(dec!(0.0001), dec!(10_000_000_000_000_000_000_000_000))
            .is_approved());
        assert!(gate.stop_loss_triggered(Decimal::MAX, dec!(1)));
        assert!(!gate.stop_loss_triggered(Decimal::MAX, Decimal::MAX));
    }

    #[test]
    fn test_stop_loss() {
        let gate = gate();
        assert!(gate.stop_loss_triggered(dec!(100), dec!(98)));
        assert!(gate.stop_loss_triggered(dec!(100), dec!(90)));
        assert!(!gate.stop_loss_triggered(dec!(100), dec!(98.01)));
    }
}
