//! Execution configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::execution::{BackoffKind, ExecutionSettings, RetryPolicy};
use crate::application::risk::CooldownScope;
use crate::domain::RiskPolicy;

/// `[execution]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Upper bound on a single place, cancel or status call.
    #[serde(default = "default_order_timeout_ms")]
    pub order_timeout_ms: u64,
    /// How long an order may stay open before it is cancelled and retried.
    #[serde(default = "default_fill_timeout_ms")]
    pub fill_timeout_ms: u64,
    #[serde(default = "default_fill_poll_interval_ms")]
    pub fill_poll_interval_ms: u64,
    /// Executions allowed to run at once across all symbols.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default)]
    pub cooldown_scope: CooldownScope,
    #[serde(default)]
    pub backoff: BackoffKind,
    /// Cap for exponential backoff.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// JSON-lines audit file. Empty disables the audit log.
    #[serde(default = "default_audit_path")]
    pub audit_path: String,
}

const fn default_order_timeout_ms() -> u64 {
    10_000
}

const fn default_fill_timeout_ms() -> u64 {
    30_000
}

const fn default_fill_poll_interval_ms() -> u64 {
    500
}

const fn default_max_concurrent() -> usize {
    4
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_audit_path() -> String {
    "crossarb-audit.jsonl".to_string()
}

impl ExecutionConfig {
    /// Timing settings for the coordinator.
    #[must_use]
    pub fn settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            order_timeout: Duration::from_millis(self.order_timeout_ms),
            fill_timeout: Duration::from_millis(self.fill_timeout_ms),
            fill_poll_interval: Duration::from_millis(self.fill_poll_interval_ms),
        }
    }

    /// Retry policy combining the risk limits with the configured backoff.
    #[must_use]
    pub fn retry(&self, policy: &RiskPolicy) -> RetryPolicy {
        RetryPolicy::from_policy(
            policy,
            self.backoff,
            Duration::from_millis(self.max_backoff_ms),
        )
    }

    /// Audit file path, if enabled.
    #[must_use]
    pub fn audit_path(&self) -> Option<&str> {
        Some(self.audit_path.trim()).filter(|p| !p.is_empty())
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            order_timeout_ms: default_order_timeout_ms(),
            fill_timeout_ms: default_fill_timeout_ms(),
            fill_poll_interval_ms: default_fill_poll_interval_ms(),
            max_concurrent: default_max_concurrent(),
            cooldown_scope: CooldownScope::default(),
            backoff: BackoffKind::default(),
            max_backoff_ms: default_max_backoff_ms(),
            audit_path: default_audit_path(),
        }
    }
}
