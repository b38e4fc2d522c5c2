//! Cooldown tracking shared by concurrent executions.
//!
//! The check and the stamp happen under one lock, so two executions racing
//! for the same scope cannot both pass.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gate::RiskGate;
use crate::domain::ExchangeId;
use crate::port::inbound::risk::RiskCheckResult;

/// Which executions share a cooldown window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownScope {
    /// One window for all trades.
    #[default]
    Global,
    /// One window per exchange; a trade needs both of its exchanges clear.
    PerExchange,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CooldownKey {
    Global,
    Exchange(ExchangeId),
}

/// Last-trade timestamps per cooldown key.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    scope: CooldownScope,
    last_trade: Mutex<HashMap<CooldownKey, DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new(scope: CooldownScope) -> Self {
        Self {
            scope,
            last_trade: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> CooldownScope {
        self.scope
    }

    fn keys(&self, buy: &ExchangeId, sell: &ExchangeId) -> Vec<CooldownKey> {
        match self.scope {
            CooldownScope::Global => vec![CooldownKey::Global],
            CooldownScope::PerExchange => vec![
                CooldownKey::Exchange(buy.clone()),
                CooldownKey::Exchange(sell.clone()),
            ],
        }
    }

    /// Check the cooldown for a trade between `buy` and `sell` and, if clear,
    /// stamp every key in scope with `now`.
    #[must_use]
    pub fn try_reserve(
        &self,
        gate: &RiskGate,
        buy: &ExchangeId,
        sell: &ExchangeId,
        now: DateTime<Utc>,
    ) -> RiskCheckResult {
        let keys = self.keys(buy, sell);
        let mut last_trade = self.last_trade.lock();

        for key in &keys {
            let result = gate.cooldown_ok(last_trade.get(key).copied(), now);
            if !result.is_approved() {
                debug!(key = ?key, "Cooldown active");
                return result;
            }
        }

        for key in keys {
            last_trade.insert(key, now);
        }
        RiskCheckResult::Approved
    }

    /// Most recent trade time touching `exchange`, or the global one.
    pub fn last_trade(&self, exchange: Option<&ExchangeId>) -> Option<DateTime<Utc>> {
        let key = match exchange {
            Some(id) => CooldownKey::Exchange(id.clone()),
            None => CooldownKey::Global,
        };
        self.last_trade.lock().get(&key).copied()
    }
}
