//! Bounded pool of concurrent executions.
//!
//! A semaphore caps the number of running executions; excess submissions wait
//! for a permit. Independently, at most one execution per symbol may be in
//! flight; a second submission for a busy symbol is dropped.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::coordinator::ExecutionCoordinator;
use crate::domain::{ArbitrageExecution, ArbitrageOpportunity, Symbol, Volume};
use crate::error::Result;

/// Holds a symbol's in-flight slot until dropped.
#[derive(Debug)]
pub struct SymbolGuard {
    symbol: Symbol,
    in_flight: Arc<Mutex<HashSet<Symbol>>>,
}

impl Drop for SymbolGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.symbol);
    }
}

/// Runs executions on tokio tasks under a concurrency limit.
pub struct ExecutionPool {
    coordinator: Arc<ExecutionCoordinator>,
    permits: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashSet<Symbol>>>,
}

impl ExecutionPool {
    pub fn new(coordinator: Arc<ExecutionCoordinator>, max_concurrent: usize) -> Self {
        Self {
            coordinator,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim the in-flight slot for a symbol, if free.
    pub fn try_lock_symbol(&self, symbol: &Symbol) -> Option<SymbolGuard> {
        if !self.in_flight.lock().insert(symbol.clone()) {
            return None;
        }
        Some(SymbolGuard {
            symbol: symbol.clone(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Number of symbols with an execution in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a permit and spawn the execution.
    ///
    /// Returns `None` without waiting if the symbol already has an execution
    /// in flight.
    pub async fn submit(
        &self,
        opportunity: ArbitrageOpportunity,
        trade_size: Volume,
        portfolio_value: Volume,
    ) -> Option<JoinHandle<Result<ArbitrageExecution>>> {
        let Some(guard) = self.try_lock_symbol(opportunity.symbol()) else {
            debug!(symbol = %opportunity.symbol(), "Execution already in flight, skipping");
            return None;
        };

        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(error = %e, "Execution pool closed");
                return None;
            }
        };

        let coordinator = Arc::clone(&self.coordinator);
        Some(tokio::spawn(async move {
            let _permit = permit;
            let _guard = guard;
            coordinator
                .execute(opportunity, trade_size, portfolio_value)
                .await
        }))
    }

    /// Stop handing out permits; pending submissions return `None`.
    pub fn close(&self) {
        self.permits.close();
    }
}
