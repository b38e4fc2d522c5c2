//! Price oracle that fans out to every registered exchange connector.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::{PriceSnapshot, Symbol};
use crate::error::Error;
use crate::port::outbound::clock::Clock;
use crate::port::outbound::exchange::{ExchangeConnector, PriceOracle};

/// Queries all connectors concurrently; slow or failing exchanges are left
/// out of the snapshot.
pub struct ConnectorOracle {
    connectors: Vec<Arc<dyn ExchangeConnector>>,
    quote_timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl ConnectorOracle {
    pub fn new(
        connectors: Vec<Arc<dyn ExchangeConnector>>,
        quote_timeout: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connectors,
            quote_timeout,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

#[async_trait]
impl PriceOracle for ConnectorOracle {
    async fn snapshot(&self, symbol: &Symbol) -> PriceSnapshot {
        let taken_at = self.clock.now();
        let quotes = join_all(self.connectors.iter().map(|connector| async move {
            let result = timeout(self.quote_timeout, connector.fetch_price(symbol)).await;
            (connector.id().clone(), result)
        }))
        .await;

        let mut snapshot = PriceSnapshot::new(symbol.clone(), taken_at);
        for (exchange, result) in quotes {
            let reason = match result {
                Ok(Ok(price)) => match snapshot.insert(exchange.clone(), price, taken_at) {
                    Ok(()) => continue,
                    Err(e) => e.to_string(),
                },
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("no quote within {}ms", self.quote_timeout.as_millis()),
            };
            let error = Error::ExchangeUnavailable { exchange, reason };
            warn!(symbol = %symbol, error = %error, "Excluded from snapshot");
        }

        debug!(symbol = %symbol, exchanges = snapshot.len(), "Snapshot taken");
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::paper::PaperConnector;
    use crate::domain::{ExchangeId, OrderId, Price};
    use crate::error::GatewayError;
    use crate::port::outbound::exchange::{OrderHandle, OrderRequest};
    use crate::testkit::clock::ManualClock;
    use rust_decimal_macros::dec;

    struct DownConnector(ExchangeId);

    #[async_trait]
    impl ExchangeConnector for DownConnector {
        fn id(&self) -> &ExchangeId {
            &self.0
        }

        async fn fetch_price(&self, _symbol: &Symbol) -> Result<Price, GatewayError> {
            Err(GatewayError::Network {
                exchange: self.0.clone(),
                reason: "down".into(),
            })
        }

        async fn place_order(&self, _request: &OrderRequest) -> Result<OrderHandle, GatewayError> {
            unreachable!("not used by the oracle")
        }

        async fn cancel_order(&self, _order_id: &OrderId) -> Result<bool, GatewayError> {
            unreachable!("not used by the oracle")
        }

        async fn order_status(&self, _order_id: &OrderId) -> Result<OrderHandle, GatewayError> {
            unreachable!("not used by the oracle")
        }
    }

    struct SlowConnector(ExchangeId);

    #[async_trait]
    impl ExchangeConnector for SlowConnector {
        fn id(&self) -> &ExchangeId {
            &self.0
        }

        async fn fetch_price(&self, _symbol: &Symbol) -> Result<Price, GatewayError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(dec!(1))
        }

        async fn place_order(&self, _request: &OrderRequest) -> Result<OrderHandle, GatewayError> {
            unreachable!("not used by the oracle")
        }

        async fn cancel_order(&self, _order_id: &OrderId) -> Result<bool, GatewayError> {
            unreachable!("not used by the oracle")
        }

        async fn order_status(&self, _order_id: &OrderId) -> Result<OrderHandle, GatewayError> {
            unreachable!("not used by the oracle")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_and_slow_exchanges_are_omitted() {
        let connectors: Vec<Arc<dyn ExchangeConnector>> = vec![
            Arc::new(PaperConnector::fixed(ExchangeId::from("binance"), dec!(100))),
            Arc::new(DownConnector(ExchangeId::from("kraken"))),
            Arc::new(SlowConnector(ExchangeId::from("okx"))),
            Arc::new(PaperConnector::fixed(ExchangeId::from("coinbase"), dec!(101))),
        ];
        let oracle = ConnectorOracle::new(
            connectors,
            Duration::from_secs(2),
            Arc::new(ManualClock::default()),
        );

        let snapshot = oracle.snapshot(&Symbol::from("BTC/USDT")).await;

        let ids: Vec<_> = snapshot.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["binance", "coinbase"]);
        assert_eq!(snapshot.price(&ExchangeId::from("coinbase")), Some(dec!(101)));
    }
}
