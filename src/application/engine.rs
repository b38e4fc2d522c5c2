//! Detection loop tying the oracle, detector and execution pool together.
//!
//! One task per symbol ticks at the poll interval: take a snapshot, evaluate
//! it, announce any opportunity, then either hand it to the pool or, with
//! execution disabled, only log it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::detector::{ArbitrageDetector, DetectionOutcome};
use super::execution::ExecutionPool;
use crate::domain::{
    ArbitrageExecution, ArbitrageOpportunity, FeeSchedule, PriceSnapshot, RiskPolicy, Symbol,
    Volume,
};
use crate::domain::policy::saturating_millis;
use crate::error::Result;
use crate::port::outbound::exchange::PriceOracle;
use crate::port::outbound::notifier::{Event, Notifier, NullNotifier, OpportunityEvent};

/// Static knobs for the detection loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub symbols: Vec<Symbol>,
    pub poll_interval: Duration,
    /// Size of every trade, in base asset units.
    pub trade_size: Volume,
    /// Portfolio value handed to the exposure check.
    pub portfolio_value: Volume,
    /// Global kill switch.
    pub trade_execution_enabled: bool,
}

/// One snapshot and what the detector made of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub snapshot: PriceSnapshot,
    pub outcome: DetectionOutcome,
}

/// What one detection cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Fewer than two exchanges quoted.
    InsufficientData { available: usize },
    /// Best pair did not clear the profit threshold.
    BelowThreshold,
    /// Opportunity found, execution disabled.
    ExecutionDisabled(ArbitrageOpportunity),
    /// Opportunity found, but the symbol already has an execution in flight.
    SymbolBusy(ArbitrageOpportunity),
    /// Opportunity handed to the pool.
    Submitted(JoinHandle<Result<ArbitrageExecution>>),
}

/// Drives detection for every configured symbol.
pub struct ArbitrageEngine {
    detector: ArbitrageDetector,
    oracle: Arc<dyn PriceOracle>,
    fees: Arc<FeeSchedule>,
    policy: Arc<RiskPolicy>,
    pool: Option<Arc<ExecutionPool>>,
    notifier: Arc<dyn Notifier>,
    settings: EngineSettings,
}

impl ArbitrageEngine {
    /// Create a detection-only engine. Attach a pool with
    /// [`with_pool`](Self::with_pool) to trade.
    pub fn new(
        detector: ArbitrageDetector,
        oracle: Arc<dyn PriceOracle>,
        fees: Arc<FeeSchedule>,
        policy: Arc<RiskPolicy>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            detector,
            oracle,
            fees,
            policy,
            pool: None,
            notifier: Arc::new(NullNotifier),
            settings,
        }
    }

    #[must_use]
    pub fn with_pool(mut self, pool: Arc<ExecutionPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// Take a snapshot and evaluate it, without side effects.
    pub async fn scan(&self, symbol: &Symbol) -> ScanReport {
        let snapshot = self.oracle.snapshot(symbol).await;
        let outcome = self.detector.evaluate(&snapshot, &self.fees, &self.policy);
        ScanReport { snapshot, outcome }
    }

    /// Run one detection cycle for a symbol.
    pub async fn run_cycle(&self, symbol: &Symbol) -> CycleOutcome {
        let report = self.scan(symbol).await;
        let opportunity = match report.outcome {
            DetectionOutcome::Opportunity(opportunity) => opportunity,
            DetectionOutcome::InsufficientData { available } => {
                return CycleOutcome::InsufficientData { available };
            }
            DetectionOutcome::BelowThreshold { .. } => return CycleOutcome::BelowThreshold,
        };

        self.notifier.notify(Event::OpportunityDetected(OpportunityEvent::from(
            &opportunity,
        )));

        let pool = match &self.pool {
            Some(pool) if self.settings.trade_execution_enabled => pool,
            _ => {
                info!(opportunity = %opportunity, "Trade execution disabled, not executing");
                return CycleOutcome::ExecutionDisabled(opportunity);
            }
        };

        match pool
            .submit(
                opportunity.clone(),
                self.settings.trade_size,
                self.settings.portfolio_value,
            )
            .await
        {
            Some(handle) => CycleOutcome::Submitted(handle),
            None => CycleOutcome::SymbolBusy(opportunity),
        }
    }

    /// Run every symbol's loop until `shutdown` turns true or its sender is
    /// dropped, then wait for in-flight executions to finish.
    pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        info!(
            symbols = self.settings.symbols.len(),
            poll_interval_ms = saturating_millis(self.settings.poll_interval),
            trade_execution_enabled = self.settings.trade_execution_enabled,
            "Engine started"
        );

        let tasks: Vec<_> = self
            .settings
            .symbols
            .iter()
            .cloned()
            .map(|symbol| {
                let engine = Arc::clone(&self);
                let shutdown = shutdown.clone();
                tokio::spawn(async move { engine.symbol_loop(symbol, shutdown).await })
            })
            .collect();

        for task in tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Symbol loop panicked");
            }
        }

        if let Some(pool) = &self.pool {
            pool.close();
        }
        info!("Engine stopped");
    }

    async fn symbol_loop(&self, symbol: Symbol, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.settings.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight: Vec<JoinHandle<Result<ArbitrageExecution>>> = Vec::new();

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        debug!(symbol = %symbol, "Symbol loop stopping");
                        break;
                    }
                }
                _ = interval.tick() => {
                    in_flight.retain(|handle| !handle.is_finished());
                    match self.run_cycle(&symbol).await {
                        CycleOutcome::Submitted(handle) => in_flight.push(handle),
                        CycleOutcome::SymbolBusy(opportunity) => {
                            debug!(opportunity = %opportunity, "Execution in flight, opportunity dropped");
                        }
                        CycleOutcome::InsufficientData { available } => {
                            debug!(symbol = %symbol, available, "Not enough quotes");
                        }
                        CycleOutcome::BelowThreshold | CycleOutcome::ExecutionDisabled(_) => {}
                    }
                }
            }
        }

        for handle in in_flight {
            match handle.await {
                Ok(Ok(execution)) => {
                    debug!(execution_id = %execution.id(), state = %execution.state(), "Drained execution");
                }
                Ok(Err(e)) => warn!(symbol = %symbol, error = %e, "Execution failed"),
                Err(e) => error!(symbol = %symbol, error = %e, "Execution task panicked"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::detector::DetectionMode;
    use crate::application::execution::ExecutionCoordinator;
    use crate::domain::ExecutionState;
    use crate::testkit::domain::{epoch, instant_policy};
    use crate::testkit::gateway::ScriptedGateway;
    use crate::testkit::market::{FixedConditions, StaticOracle};
    use crate::testkit::notifier::RecordingNotifier;
    use rust_decimal_macros::dec;

    fn settings(enabled: bool) -> EngineSettings {
        EngineSettings {
            symbols: vec![Symbol::from("BTC/USDT")],
            poll_interval: Duration::from_millis(100),
            trade_size: dec!(1),
            portfolio_value: dec!(10),
            trade_execution_enabled: enabled,
        }
    }

    fn engine(
        oracle: StaticOracle,
        gateway: Arc<ScriptedGateway>,
        enabled: bool,
    ) -> (ArbitrageEngine, RecordingNotifier) {
        let policy = Arc::new(instant_policy());
        let coordinator = ExecutionCoordinator::new(
            Arc::clone(&policy),
            gateway,
            Arc::new(FixedConditions::calm()),
        );
        let pool = Arc::new(ExecutionPool::new(Arc::new(coordinator), 2));
        let notifier = RecordingNotifier::new();
        let engine = ArbitrageEngine::new(
            ArbitrageDetector::new(DetectionMode::Pairwise),
            Arc::new(oracle),
            Arc::new(FeeSchedule::new()),
            policy,
            settings(enabled),
        )
        .with_pool(pool)
        .with_notifier(Arc::new(notifier.clone()));
        (engine, notifier)
    }

    fn profitable() -> StaticOracle {
        StaticOracle::new(epoch()).with(
            "BTC/USDT",
            &[("binance", dec!(100)), ("kraken", dec!(105))],
        )
    }

    #[tokio::test]
    async fn test_cycle_submits_opportunity_when_enabled() {
        let gateway = Arc::new(ScriptedGateway::new());
        let (engine, notifier) = engine(profitable(), Arc::clone(&gateway), true);

        let outcome = engine.run_cycle(&Symbol::from("BTC/USDT")).await;

        let CycleOutcome::Submitted(handle) = outcome else {
            panic!("expected submission, got {outcome:?}");
        };
        let execution = handle.await.unwrap().unwrap();
        assert_eq!(execution.state(), ExecutionState::Completed);
        assert_eq!(gateway.place_calls(), 2);
        assert_eq!(
            notifier.count(|e| matches!(e, Event::OpportunityDetected(_))),
            1
        );
    }

    #[tokio::test]
    async fn test_kill_switch_logs_without_executing() {
        let gateway = Arc::new(ScriptedGateway::new());
        let (engine, notifier) = engine(profitable(), Arc::clone(&gateway), false);

        let outcome = engine.run_cycle(&Symbol::from("BTC/USDT")).await;

        assert!(matches!(outcome, CycleOutcome::ExecutionDisabled(_)));
        assert_eq!(gateway.place_calls(), 0);
        assert_eq!(notifier.len(), 1);
    }

    #[tokio::test]
    async fn test_single_quote_is_insufficient_data() {
        let oracle = StaticOracle::new(epoch()).with("BTC/USDT", &[("binance", dec!(100))]);
        let gateway = Arc::new(ScriptedGateway::new());
        let (engine, notifier) = engine(oracle, gateway, true);

        let outcome = engine.run_cycle(&Symbol::from("BTC/USDT")).await;

        assert!(matches!(
            outcome,
            CycleOutcome::InsufficientData { available: 1 }
        ));
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn test_flat_market_is_below_threshold() {
        let oracle = StaticOracle::new(epoch()).with(
            "BTC/USDT",
            &[("binance", dec!(100)), ("kraken", dec!(100.1))],
        );
        let (engine, _) = engine(oracle, Arc::new(ScriptedGateway::new()), true);

        let outcome = engine.run_cycle(&Symbol::from("BTC/USDT")).await;

        assert!(matches!(outcome, CycleOutcome::BelowThreshold));
    }

    #[tokio::test]
    async fn test_scan_reports_snapshot_and_outcome() {
        let (engine, notifier) = engine(profitable(), Arc::new(ScriptedGateway::new()), true);

        let report = engine.scan(&Symbol::from("BTC/USDT")).await;

        assert_eq!(report.snapshot.len(), 2);
        let opportunity = report.outcome.into_opportunity().unwrap();
        assert_eq!(opportunity.buy_exchange().as_str(), "binance");
        assert!(notifier.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let (engine, _) = engine(profitable(), Arc::new(ScriptedGateway::new()), false);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(Arc::new(engine).run(rx));
        tokio::time::sleep(Duration::from_millis(350)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
