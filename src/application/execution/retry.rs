//! Bounded retry policy for order placement.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::RiskPolicy;

/// Backoff shape selected in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

/// Delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// Doubles on each retry, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

/// How many times a failed attempt may be retried, and how long to wait.
///
/// A leg gets at most `max_retries + 1` attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, backoff: Backoff) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Retry policy taken from the risk policy's retry settings.
    pub fn from_policy(policy: &RiskPolicy, kind: BackoffKind, max_backoff: Duration) -> Self {
        let initial = policy.retry_backoff();
        let backoff = match kind {
            BackoffKind::Fixed => Backoff::Fixed(initial),
            BackoffKind::Exponential => Backoff::Exponential {
                initial,
                max: max_backoff.max(initial),
            },
        };
        Self::new(policy.max_retries, backoff)
    }

    /// Whether another retry is allowed after `retries_done` retries.
    #[must_use]
    pub const fn allows_retry(&self, retries_done: u32) -> bool {
        retries_done < self.max_retries
    }

    /// Total attempts including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay(&self, retry: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(retry.saturating_sub(1));
                initial.saturating_mul(factor).min(max)
            }
        }
    }

    /// Sleep before retry number `retry`.
    pub async fn wait(&self, retry: u32) {
        let delay = self.delay(retry);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_policy(
            &RiskPolicy::default(),
            BackoffKind::Fixed,
            Duration::from_secs(60),
        )
    }
}
