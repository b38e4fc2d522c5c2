//! Fee-adjusted cross-exchange arbitrage detection.
//!
//! For a buy exchange `b` and sell exchange `s`:
//!
//! ```text
//! gross = price[s] - price[b]
//! net%  = (gross - price[b]*tf[b] - price[s]*tf[s] - wd[s]) / price[b] * 100
//! ```
//!
//! where `tf[x]` is the trading fee fraction and `wd[s]` is the sell-side
//! withdrawal fee for the base asset, valued at the buy price.
//!
//! Detection is a pure function of its inputs: the same snapshot, fees and
//! policy always give the same outcome, including `detected_at`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    ArbitrageOpportunity, ExchangeId, FeeSchedule, Percent, Price, PriceSnapshot, RiskPolicy,
};

/// How candidate pairs are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Every ordered pair of distinct exchanges; picks the fee-optimal one.
    #[default]
    Pairwise,
    /// Only the globally cheapest and dearest exchanges, fee-adjusted.
    MinMax,
}

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// An opportunity at or above the profit threshold.
    Opportunity(ArbitrageOpportunity),
    /// Fewer than two exchanges reported, or no pair had a computable profit.
    InsufficientData { available: usize },
    /// The best pair did not clear `min_profit_percent`.
    BelowThreshold {
        buy_exchange: ExchangeId,
        sell_exchange: ExchangeId,
        net_profit_percent: Percent,
    },
}

impl DetectionOutcome {
    /// The opportunity, if one was found.
    #[must_use]
    pub fn into_opportunity(self) -> Option<ArbitrageOpportunity> {
        match self {
            Self::Opportunity(opp) => Some(opp),
            _ => None,
        }
    }
}

/// Best candidate pair found in a snapshot.
struct Candidate<'a> {
    buy: &'a ExchangeId,
    buy_price: Price,
    sell: &'a ExchangeId,
    sell_price: Price,
    net: Percent,
}

/// Stateless arbitrage detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArbitrageDetector {
    mode: DetectionMode,
}

impl ArbitrageDetector {
    pub const fn new(mode: DetectionMode) -> Self {
        Self { mode }
    }

    pub const fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Evaluate a snapshot, distinguishing "no data" from "no edge".
    #[must_use]
    pub fn evaluate(
        &self,
        snapshot: &PriceSnapshot,
        fees: &FeeSchedule,
        policy: &RiskPolicy,
    ) -> DetectionOutcome {
        if snapshot.len() < 2 {
            debug!(
                symbol = %snapshot.symbol(),
                available = snapshot.len(),
                "Insufficient data for detection"
            );
            return DetectionOutcome::InsufficientData {
                available: snapshot.len(),
            };
        }

        let base = snapshot.symbol().base_asset();
        let best = match self.mode {
            DetectionMode::Pairwise => best_pairwise(snapshot, fees, base),
            DetectionMode::MinMax => best_min_max(snapshot, fees, base),
        };
        let Some(best) = best else {
            return DetectionOutcome::InsufficientData {
                available: snapshot.len(),
            };
        };

        if best.net < policy.min_profit_percent {
            debug!(
                symbol = %snapshot.symbol(),
                buy = %best.buy,
                sell = %best.sell,
                net = %best.net,
                threshold = %policy.min_profit_percent,
                "Best pair below profit threshold"
            );
            return DetectionOutcome::BelowThreshold {
                buy_exchange: best.buy.clone(),
                sell_exchange: best.sell.clone(),
                net_profit_percent: best.net,
            };
        }

        let built = ArbitrageOpportunity::builder()
            .symbol(snapshot.symbol().clone())
            .buy(best.buy.clone(), best.buy_price)
            .sell(best.sell.clone(), best.sell_price)
            .net_profit_percent(best.net)
            .detected_at(snapshot.taken_at())
            .build();

        match built {
            Ok(opportunity) => DetectionOutcome::Opportunity(opportunity),
            Err(error) => {
                warn!(symbol = %snapshot.symbol(), error = %error, "Discarded malformed candidate");
                DetectionOutcome::InsufficientData {
                    available: snapshot.len(),
                }
            }
        }
    }

    /// Best opportunity in the snapshot, if any clears the threshold.
    #[must_use]
    pub fn detect(
        &self,
        snapshot: &PriceSnapshot,
        fees: &FeeSchedule,
        policy: &RiskPolicy,
    ) -> Option<ArbitrageOpportunity> {
        self.evaluate(snapshot, fees, policy).into_opportunity()
    }
}

/// Fee-adjusted net profit percent of buying on `buy` and selling on `sell`.
///
/// `None` when the result does not fit in a decimal.
#[must_use]
pub fn net_profit_percent(
    fees: &FeeSchedule,
    base_asset: &str,
    buy: &ExchangeId,
    buy_price: Price,
    sell: &ExchangeId,
    sell_price: Price,
) -> Option<Percent> {
    let hundred = Percent::ONE_HUNDRED;
    let fee = |price: Price, percent: Percent| price.checked_mul(percent)?.checked_div(hundred);

    let buy_fee = fee(buy_price, fees.trading_fee_percent(buy))?;
    let sell_fee = fee(sell_price, fees.trading_fee_percent(sell))?;
    let withdrawal = fee(buy_price, fees.withdrawal_fee_percent(sell, base_asset))?;
    sell_price
        .checked_sub(buy_price)?
        .checked_sub(buy_fee)?
        .checked_sub(sell_fee)?
        .checked_sub(withdrawal)?
        .checked_div(buy_price)?
        .checked_mul(hundred)
}

fn overflowed(buy: &ExchangeId, buy_price: Price, sell: &ExchangeId, sell_price: Price) {
    warn!(
        buy = %buy,
        buy_price = %buy_price,
        sell = %sell,
        sell_price = %sell_price,
        "Skipping pair, profit overflows"
    );
}

// Iteration is ordered by (buy, sell) and only a strictly better net replaces
// the incumbent, so ties keep the lexicographically smallest pair.
fn best_pairwise<'a>(
    snapshot: &'a PriceSnapshot,
    fees: &FeeSchedule,
    base: &str,
) -> Option<Candidate<'a>> {
    let mut best: Option<Candidate<'a>> = None;
    for (buy, buy_quote) in snapshot.iter() {
        for (sell, sell_quote) in snapshot.iter() {
            if buy == sell {
                continue;
            }
            let Some(net) =
                net_profit_percent(fees, base, buy, buy_quote.price, sell, sell_quote.price)
            else {
                overflowed(buy, buy_quote.price, sell, sell_quote.price);
                continue;
            };
            if best.as_ref().map_or(true, |b| net > b.net) {
                best = Some(Candidate {
                    buy,
                    buy_price: buy_quote.price,
                    sell,
                    sell_price: sell_quote.price,
                    net,
                });
            }
        }
    }
    best
}

fn best_min_max<'a>(
    snapshot: &'a PriceSnapshot,
    fees: &FeeSchedule,
    base: &str,
) -> Option<Candidate<'a>> {
    let mut cheapest: Option<(&'a ExchangeId, Price)> = None;
    for (id, quote) in snapshot.iter() {
        if cheapest.map_or(true, |(_, p)| quote.price < p) {
            cheapest = Some((id, quote.price));
        }
    }
    let (buy, buy_price) = cheapest?;

    let mut dearest: Option<(&'a ExchangeId, Price)> = None;
    for (id, quote) in snapshot.iter().filter(|(id, _)| *id != buy) {
        if dearest.map_or(true, |(_, p)| quote.price > p) {
            dearest = Some((id, quote.price));
        }
    }
    let (sell, sell_price) = dearest?;

    let Some(net) = net_profit_percent(fees, base, buy, buy_price, sell, sell_price) else {
        overflowed(buy, buy_price, sell, sell_price);
        return None;
    };
    Some(Candidate {
        buy,
        buy_price,
        sell,
        sell_price,
        net,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExchangeFees, Symbol};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn snapshot(quotes: &[(&str, Price)]) -> PriceSnapshot {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        quotes
            .iter()
            .try_fold(PriceSnapshot::new(Symbol::from("BTC/USDT"), at), |s, (ex, p)| {
                s.with_quote(*ex, *p)
            })
            .unwrap()
    }

    fn policy(min_profit: Percent) -> RiskPolicy {
        RiskPolicy {
            min_profit_percent: min_profit,
            ..RiskPolicy::default()
        }
    }

    #[test]
    fn zero_fees_pick_widest_spread() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(105)), ("C", dec!(90))]);
        let opp = ArbitrageDetector::default()
            .detect(&snap, &FeeSchedule::new(), &policy(dec!(1)))
            .unwrap();

        assert_eq!(opp.buy_exchange().as_str(), "C");
        assert_eq!(opp.sell_exchange().as_str(), "B");
        assert_eq!(opp.buy_price(), dec!(90));
        assert_eq!(opp.sell_price(), dec!(105));
        assert_eq!(opp.net_profit_percent().round_dp(2), dec!(16.67));
        assert_eq!(opp.gross_profit_percent(), opp.net_profit_percent());
    }

    #[test]
    fn fees_can_change_the_winning_pair() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(105)), ("C", dec!(90))]);
        let fees = FeeSchedule::new().with("C", ExchangeFees::trading(dec!(20)));
        let opp = ArbitrageDetector::default()
            .detect(&snap, &fees, &policy(dec!(1)))
            .unwrap();

        assert_eq!(opp.buy_exchange().as_str(), "A");
        assert_eq!(opp.sell_exchange().as_str(), "B");
        assert_eq!(opp.net_profit_percent(), dec!(5));
    }

    #[test]
    fn overflowing_pair_is_skipped() {
        let snap = snapshot(&[
            ("A", dec!(0.00000000000000000001)),
            ("B", dec!(10_000_000_000)),
        ]);
        let fees = FeeSchedule::new();
        let policy = RiskPolicy::default();

        // A -> B overflows; only B -> A is left.
        match ArbitrageDetector::default().evaluate(&snap, &fees, &policy) {
            DetectionOutcome::BelowThreshold {
                buy_exchange,
                sell_exchange,
                ..
            } => {
                assert_eq!(buy_exchange.as_str(), "B");
                assert_eq!(sell_exchange.as_str(), "A");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(matches!(
            ArbitrageDetector::new(DetectionMode::MinMax).evaluate(&snap, &fees, &policy),
            DetectionOutcome::InsufficientData { available: 2 }
        ));
        assert_eq!(
            net_profit_percent(
                &fees,
                "BTC",
                &ExchangeId::from("A"),
                dec!(0.00000000000000000001),
                &ExchangeId::from("B"),
                dec!(10_000_000_000),
            ),
            None
        );
    }

    #[test]
    fn withdrawal_fee_uses_sell_side_schedule_and_base_asset() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(110))]);
        let fees = FeeSchedule::new()
            .with("B", ExchangeFees::default().with_withdrawal("BTC", dec!(2)))
            .with("A", ExchangeFees::default().with_withdrawal("BTC", dec!(50)));
        let opp = ArbitrageDetector::default()
            .detect(&snap, &fees, &policy(dec!(0)))
            .unwrap();

        // (10 - 100 * 0.02) / 100 * 100
        assert_eq!(opp.net_profit_percent(), dec!(8));
    }

    #[test]
    fn ties_prefer_smaller_buy_exchange() {
        let snap = snapshot(&[("a", dec!(100)), ("b", dec!(110)), ("c", dec!(100))]);
        let opp = ArbitrageDetector::default()
            .detect(&snap, &FeeSchedule::new(), &policy(dec!(1)))
            .unwrap();

        assert_eq!(opp.buy_exchange().as_str(), "a");
        assert_eq!(opp.sell_exchange().as_str(), "b");
    }

    #[test]
    fn single_exchange_is_insufficient_data() {
        let snap = snapshot(&[("A", dec!(100))]);
        let outcome =
            ArbitrageDetector::default().evaluate(&snap, &FeeSchedule::new(), &policy(dec!(1)));
        assert_eq!(outcome, DetectionOutcome::InsufficientData { available: 1 });
    }

    #[test]
    fn below_threshold_is_reported_not_emitted() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(100.5))]);
        let outcome =
            ArbitrageDetector::default().evaluate(&snap, &FeeSchedule::new(), &policy(dec!(1)));

        match outcome {
            DetectionOutcome::BelowThreshold {
                buy_exchange,
                sell_exchange,
                net_profit_percent,
            } => {
                assert_eq!(buy_exchange.as_str(), "A");
                assert_eq!(sell_exchange.as_str(), "B");
                assert_eq!(net_profit_percent, dec!(0.5));
            }
            other => panic!("expected BelowThreshold, got {other:?}"),
        }
    }

    #[test]
    fn net_exactly_at_threshold_is_emitted() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(101))]);
        let opp = ArbitrageDetector::default().detect(&snap, &FeeSchedule::new(), &policy(dec!(1)));
        assert!(opp.is_some());
    }

    #[test]
    fn detection_is_idempotent() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(105)), ("C", dec!(90))]);
        let fees = FeeSchedule::new().with("B", ExchangeFees::trading(dec!(0.1)));
        let detector = ArbitrageDetector::default();

        let first = detector.evaluate(&snap, &fees, &policy(dec!(1)));
        let second = detector.evaluate(&snap, &fees, &policy(dec!(1)));
        assert_eq!(first, second);
    }

    #[test]
    fn min_max_uses_global_extremes() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(105)), ("C", dec!(90))]);
        let fees = FeeSchedule::new().with("C", ExchangeFees::trading(dec!(2)));
        let opp = ArbitrageDetector::new(DetectionMode::MinMax)
            .detect(&snap, &fees, &policy(dec!(1)))
            .unwrap();

        assert_eq!(opp.buy_exchange().as_str(), "C");
        assert_eq!(opp.sell_exchange().as_str(), "B");
        // (15 - 1.8) / 90 * 100
        assert_eq!(opp.net_profit_percent().round_dp(2), dec!(14.67));
    }

    #[test]
    fn min_max_ignores_better_fee_adjusted_pairs() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(105)), ("C", dec!(90))]);
        let fees = FeeSchedule::new().with("C", ExchangeFees::trading(dec!(20)));

        let pairwise = ArbitrageDetector::new(DetectionMode::Pairwise)
            .detect(&snap, &fees, &policy(dec!(1)))
            .unwrap();
        assert_eq!(pairwise.buy_exchange().as_str(), "A");

        let outcome = ArbitrageDetector::new(DetectionMode::MinMax).evaluate(
            &snap,
            &fees,
            &policy(dec!(1)),
        );
        assert!(matches!(
            outcome,
            DetectionOutcome::BelowThreshold { ref buy_exchange, .. } if buy_exchange.as_str() == "C"
        ));
    }

    #[test]
    fn min_max_with_flat_prices_uses_distinct_exchanges() {
        let snap = snapshot(&[("A", dec!(100)), ("B", dec!(100))]);
        let outcome = ArbitrageDetector::new(DetectionMode::MinMax).evaluate(
            &snap,
            &FeeSchedule::new(),
            &policy(dec!(1)),
        );
        assert!(matches!(
            outcome,
            DetectionOutcome::BelowThreshold { ref buy_exchange, ref sell_exchange, .. }
                if buy_exchange.as_str() == "A" && sell_exchange.as_str() == "B"
        ));
    }
}
