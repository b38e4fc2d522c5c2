//! Builders for domain primitives used across tests.
//!
//! Concise factories for ids, snapshots, opportunities and policies so
//! tests focus on assertions rather than construction boilerplate.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{ArbitrageOpportunity, ExchangeId, Price, PriceSnapshot, RiskPolicy, Symbol};

/// Fixed instant used as "now" in tests.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Create an [`ExchangeId`] from a string.
pub fn exchange(id: &str) -> ExchangeId {
    ExchangeId::from(id)
}

/// Create a [`Symbol`] from a string.
pub fn symbol(s: &str) -> Symbol {
    Symbol::from(s)
}

/// Snapshot of `BTC/USDT` with the given quotes, taken at [`epoch`].
///
/// # Panics
///
/// Panics if a price is not positive.
pub fn snapshot(quotes: &[(&str, Price)]) -> PriceSnapshot {
    quotes
        .iter()
        .try_fold(PriceSnapshot::new(symbol("BTC/USDT"), epoch()), |s, (ex, p)| {
            s.with_quote(*ex, *p)
        })
        .expect("test prices must be positive")
}

/// `BTC/USDT` opportunity buying on `buy` and selling on `sell`, fee-free.
///
/// # Panics
///
/// Panics if the exchanges are equal or a price is not positive.
pub fn opportunity(buy: &str, buy_price: Price, sell: &str, sell_price: Price) -> ArbitrageOpportunity {
    let net = (sell_price - buy_price) / buy_price * Decimal::ONE_HUNDRED;
    ArbitrageOpportunity::builder()
        .symbol(symbol("BTC/USDT"))
        .buy(exchange(buy), buy_price)
        .sell(exchange(sell), sell_price)
        .net_profit_percent(net)
        .detected_at(epoch())
        .build()
        .expect("valid test opportunity")
}

/// Default policy with every delay set to zero, so execution tests run
/// without waiting.
pub fn instant_policy() -> RiskPolicy {
    RiskPolicy {
        retry_backoff_seconds: 0.0,
        max_transfer_seconds: 0.0,
        ..RiskPolicy::default()
    }
}
