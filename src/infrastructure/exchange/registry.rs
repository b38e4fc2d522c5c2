//! Known exchanges and connector routing.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::adapter::outbound::paper::PaperConnector;
use crate::domain::{ExchangeId, OrderId};
use crate::error::{ConfigError, GatewayError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::exchange::{
    ExchangeConnector, OrderGateway, OrderHandle, OrderRequest,
};

/// Exchanges this build knows how to name.
///
/// Configuration keys are matched case-insensitively against these names;
/// anything else is a startup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExchangeKind {
    Binance,
    Kraken,
    Coinbase,
    Bitstamp,
    Bitfinex,
    Okx,
    Bybit,
    Kucoin,
}

impl ExchangeKind {
    pub const ALL: [Self; 8] = [
        Self::Binance,
        Self::Kraken,
        Self::Coinbase,
        Self::Bitstamp,
        Self::Bitfinex,
        Self::Okx,
        Self::Bybit,
        Self::Kucoin,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Kraken => "kraken",
            Self::Coinbase => "coinbase",
            Self::Bitstamp => "bitstamp",
            Self::Bitfinex => "bitfinex",
            Self::Okx => "okx",
            Self::Bybit => "bybit",
            Self::Kucoin => "kucoin",
        }
    }

    /// Identifier used in snapshots, fees and order routing.
    #[must_use]
    pub fn id(self) -> ExchangeId {
        ExchangeId::from(self.as_str())
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownExchange {
                name: name.to_string(),
            })
    }
}

/// Connectors keyed by exchange id.
///
/// Doubles as the [`OrderGateway`] the coordinator talks to, routing each
/// call by the request's exchange.
#[derive(Default, Clone)]
pub struct ExchangeRegistry {
    connectors: BTreeMap<ExchangeId, Arc<dyn ExchangeConnector>>,
}

impl ExchangeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build paper connectors for every enabled exchange in the config.
    ///
    /// Connectors are keyed by the canonical name, so `[exchanges.Binance]`
    /// and `[fees.binance]` refer to the same exchange.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownExchange`] for a name outside
    /// [`ExchangeKind`].
    #[allow(clippy::result_large_err)]
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        for (name, exchange) in config.enabled_exchanges() {
            let kind = ExchangeKind::from_str(name)?;
            registry.register(Arc::new(PaperConnector::new(
                kind.id(),
                exchange.paper_price,
                exchange.paper_volatility_percent,
                exchange.paper_slippage_percent,
            )));
            info!(exchange = %kind, mode = "paper", "Exchange registered");
        }
        Ok(registry)
    }

    /// Add a connector, replacing any previous one with the same id.
    pub fn register(&mut self, connector: Arc<dyn ExchangeConnector>) {
        self.connectors.insert(connector.id().clone(), connector);
    }

    #[must_use]
    pub fn get(&self, exchange: &ExchangeId) -> Option<&Arc<dyn ExchangeConnector>> {
        self.connectors.get(exchange)
    }

    /// All connectors in id order.
    #[must_use]
    pub fn connectors(&self) -> Vec<Arc<dyn ExchangeConnector>> {
        self.connectors.values().cloned().collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ExchangeId> {
        self.connectors.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    fn route(
        &self,
        exchange: &ExchangeId,
    ) -> std::result::Result<&Arc<dyn ExchangeConnector>, GatewayError> {
        self.get(exchange).ok_or_else(|| GatewayError::UnknownExchange {
            exchange: exchange.clone(),
        })
    }
}

#[async_trait]
impl OrderGateway for ExchangeRegistry {
    async fn place_order(
        &self,
        request: &OrderRequest,
    ) -> std::result::Result<OrderHandle, GatewayError> {
        self.route(&request.exchange)?.place_order(request).await
    }

    async fn cancel_order(
        &self,
        exchange: &ExchangeId,
        order_id: &OrderId,
    ) -> std::result::Result<bool, GatewayError> {
        self.route(exchange)?.cancel_order(order_id).await
    }

    async fn order_status(
        &self,
        exchange: &ExchangeId,
        order_id: &OrderId,
    ) -> std::result::Result<OrderHandle, GatewayError> {
        self.route(exchange)?.order_status(order_id).await
    }
}
