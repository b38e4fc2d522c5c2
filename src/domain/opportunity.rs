//! Opportunity type with builder pattern.
//!
//! This module provides the `ArbitrageOpportunity` struct representing a
//! detected cross-exchange price discrepancy, along with
//! `OpportunityBuilder` for safe construction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ExchangeId, Symbol};
use super::money::{percent_of, Percent, Price};

/// Error returned when building an opportunity fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpportunityBuildError {
    /// Symbol is required but was not provided.
    MissingSymbol,
    /// Buy exchange and price are required but were not provided.
    MissingBuy,
    /// Sell exchange and price are required but were not provided.
    MissingSell,
    /// Net profit is required but was not provided.
    MissingNetProfit,
    /// Detection time is required but was not provided.
    MissingDetectedAt,
    /// Both legs name the same exchange.
    SameExchange,
    /// A leg price is zero or negative.
    NonPositivePrice,
    /// The gross profit percent does not fit in a decimal.
    ProfitOverflow,
}

impl fmt::Display for OpportunityBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSymbol => write!(f, "symbol is required"),
            Self::MissingBuy => write!(f, "buy exchange and price are required"),
            Self::MissingSell => write!(f, "sell exchange and price are required"),
            Self::MissingNetProfit => write!(f, "net profit percent is required"),
            Self::MissingDetectedAt => write!(f, "detected_at is required"),
            Self::SameExchange => write!(f, "buy and sell exchange must differ"),
            Self::NonPositivePrice => write!(f, "prices must be positive"),
            Self::ProfitOverflow => write!(f, "profit percent overflows"),
        }
    }
}

impl std::error::Error for OpportunityBuildError {}

/// A detected arbitrage opportunity: buy on one exchange, sell on another.
///
/// Use `ArbitrageOpportunity::builder()` to construct instances. The builder
/// derives the gross profit from the two prices and enforces that the legs
/// are on distinct exchanges with positive prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    symbol: Symbol,
    buy_exchange: ExchangeId,
    sell_exchange: ExchangeId,
    buy_price: Price,
    sell_price: Price,
    gross_profit_percent: Percent,
    net_profit_percent: Percent,
    detected_at: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    /// Create a new builder for constructing an opportunity.
    pub fn builder() -> OpportunityBuilder {
        OpportunityBuilder::new()
    }

    /// Get the traded symbol.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the exchange to buy on.
    pub fn buy_exchange(&self) -> &ExchangeId {
        &self.buy_exchange
    }

    /// Get the exchange to sell on.
    pub fn sell_exchange(&self) -> &ExchangeId {
        &self.sell_exchange
    }

    /// Get the buy price.
    pub fn buy_price(&self) -> Price {
        self.buy_price
    }

    /// Get the sell price.
    pub fn sell_price(&self) -> Price {
        self.sell_price
    }

    /// Get the spread as a percentage of the buy price, before fees.
    pub fn gross_profit_percent(&self) -> Percent {
        self.gross_profit_percent
    }

    /// Get the fee-adjusted profit as a percentage of the buy price.
    pub fn net_profit_percent(&self) -> Percent {
        self.net_profit_percent
    }

    /// Get the timestamp of the snapshot the opportunity was found in.
    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }
}

impl fmt::Display for ArbitrageOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buy {}@{} sell {}@{} net {}%",
            self.symbol,
            self.buy_exchange,
            self.buy_price,
            self.sell_exchange,
            self.sell_price,
            self.net_profit_percent.round_dp(4)
        )
    }
}

/// Builder for constructing `ArbitrageOpportunity` instances.
///
/// # Example
///
/// ```ignore
/// let opportunity = ArbitrageOpportunity::builder()
///     .symbol(symbol)
///     .buy(buy_exchange, buy_price)
///     .sell(sell_exchange, sell_price)
///     .net_profit_percent(net)
///     .detected_at(snapshot.taken_at())
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct OpportunityBuilder {
    symbol: Option<Symbol>,
    buy: Option<(ExchangeId, Price)>,
    sell: Option<(ExchangeId, Price)>,
    net_profit_percent: Option<Percent>,
    detected_at: Option<DateTime<Utc>>,
}

impl OpportunityBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    /// Set the buy exchange and price.
    pub fn buy(mut self, exchange: ExchangeId, price: Price) -> Self {
        self.buy = Some((exchange, price));
        self
    }

    /// Set the sell exchange and price.
    pub fn sell(mut self, exchange: ExchangeId, price: Price) -> Self {
        self.sell = Some((exchange, price));
        self
    }

    /// Set the fee-adjusted profit percent.
    pub fn net_profit_percent(mut self, net: Percent) -> Self {
        self.net_profit_percent = Some(net);
        self
    }

    /// Set the detection timestamp.
    pub fn detected_at(mut self, at: DateTime<Utc>) -> Self {
        self.detected_at = Some(at);
        self
    }

    /// Build the opportunity, computing the gross profit.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing, the legs share an
    /// exchange, or a price is not positive.
    pub fn build(self) -> Result<ArbitrageOpportunity, OpportunityBuildError> {
        let symbol = self.symbol.ok_or(OpportunityBuildError::MissingSymbol)?;
        let (buy_exchange, buy_price) = self.buy.ok_or(OpportunityBuildError::MissingBuy)?;
        let (sell_exchange, sell_price) = self.sell.ok_or(OpportunityBuildError::MissingSell)?;
        let net_profit_percent = self
            .net_profit_percent
            .ok_or(OpportunityBuildError::MissingNetProfit)?;
        let detected_at = self
            .detected_at
            .ok_or(OpportunityBuildError::MissingDetectedAt)?;

        if buy_exchange == sell_exchange {
            return Err(OpportunityBuildError::SameExchange);
        }
        if buy_price <= Price::ZERO || sell_price <= Price::ZERO {
            return Err(OpportunityBuildError::NonPositivePrice);
        }

        let gross_profit_percent = percent_of(sell_price - buy_price, buy_price)
            .ok_or(OpportunityBuildError::ProfitOverflow)?;

        Ok(ArbitrageOpportunity {
            symbol,
            buy_exchange,
            sell_exchange,
            buy_price,
            sell_price,
            gross_profit_percent,
            net_profit_percent,
            detected_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> OpportunityBuilder {
        ArbitrageOpportunity::builder()
            .symbol(Symbol::from("BTC/USDT"))
            .net_profit_percent(dec!(4))
            .detected_at(Utc::now())
    }

    #[test]
    fn build_computes_gross_profit() {
        let opp = base()
            .buy(ExchangeId::from("binance"), dec!(100))
            .sell(ExchangeId::from("kraken"), dec!(105))
            .build()
            .unwrap();

        assert_eq!(opp.gross_profit_percent(), dec!(5));
        assert_eq!(opp.net_profit_percent(), dec!(4));
        assert_eq!(opp.buy_exchange().as_str(), "binance");
    }

    #[test]
    fn build_rejects_same_exchange() {
        let err = base()
            .buy(ExchangeId::from("binance"), dec!(100))
            .sell(ExchangeId::from("binance"), dec!(105))
            .build()
            .unwrap_err();
        assert_eq!(err, OpportunityBuildError::SameExchange);
    }

    #[test]
    fn build_rejects_zero_price() {
        let err = base()
            .buy(ExchangeId::from("binance"), dec!(0))
            .sell(ExchangeId::from("kraken"), dec!(105))
            .build()
            .unwrap_err();
        assert_eq!(err, OpportunityBuildError::NonPositivePrice);
    }

    #[test]
    fn build_requires_sell_leg() {
        let err = base()
            .buy(ExchangeId::from("binance"), dec!(100))
            .build()
            .unwrap_err();
        assert_eq!(err, OpportunityBuildError::MissingSell);
    }
}
