//! Infrastructure bootstrap helpers for runtime wiring.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::audit::JsonlAuditLog;
use crate::adapter::outbound::conditions::StaticConditions;
use crate::adapter::outbound::notifier::LogNotifier;
use crate::application::detector::ArbitrageDetector;
use crate::application::engine::{ArbitrageEngine, EngineSettings};
use crate::application::execution::{ExecutionCoordinator, ExecutionPool};
use crate::application::oracle::ConnectorOracle;
use crate::application::risk::CooldownTracker;
use crate::domain::FeeSchedule;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::exchange::{ExchangeKind, ExchangeRegistry};
use crate::port::outbound::audit::{AuditSink, NullAuditSink};
use crate::port::outbound::clock::{Clock, SystemClock};
use crate::port::outbound::notifier::{Notifier, NotifierRegistry};

/// Build notifier registry from configuration.
pub(crate) fn build_notifier_registry(_config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}

/// Fee schedule keyed by canonical exchange names.
///
/// # Errors
///
/// Returns an error for a fee entry naming an unknown exchange.
#[allow(clippy::result_large_err)]
pub fn build_fee_schedule(config: &Config) -> Result<FeeSchedule> {
    let mut fees = FeeSchedule::new();
    for exchange in config.fees.exchanges() {
        let kind = ExchangeKind::from_str(exchange.as_str())?;
        if let Some(entry) = config.fees.get(exchange) {
            fees = fees.with(kind.id(), entry.clone());
        }
    }
    Ok(fees)
}

/// Build the audit sink, opening the JSON-lines file if one is configured.
///
/// # Errors
///
/// Returns an error if the audit file cannot be opened.
#[allow(clippy::result_large_err)]
pub fn build_audit_sink(config: &Config) -> Result<Arc<dyn AuditSink>> {
    match config.execution.audit_path() {
        Some(path) => {
            let log = JsonlAuditLog::open(path)?;
            info!(path = %log.path().display(), "Audit log enabled");
            Ok(Arc::new(log))
        }
        None => {
            info!("Audit log disabled");
            Ok(Arc::new(NullAuditSink))
        }
    }
}

fn engine_settings(config: &Config) -> EngineSettings {
    EngineSettings {
        symbols: config.symbols(),
        poll_interval: Duration::from_millis(config.arbitrage.poll_interval_ms),
        trade_size: config.arbitrage.trade_size,
        portfolio_value: config.arbitrage.portfolio_value,
        trade_execution_enabled: config.arbitrage.trade_execution_enabled,
    }
}

/// Build a detection-only engine: oracle, detector and fees, no pool.
///
/// # Errors
///
/// Returns an error if an exchange or fee entry is unknown.
#[allow(clippy::result_large_err)]
pub fn build_scanner(config: &Config) -> Result<ArbitrageEngine> {
    let registry = ExchangeRegistry::from_config(config)?;
    detection_engine(config, &registry, Arc::new(SystemClock))
}

fn detection_engine(
    config: &Config,
    registry: &ExchangeRegistry,
    clock: Arc<dyn Clock>,
) -> Result<ArbitrageEngine> {
    let oracle = ConnectorOracle::new(
        registry.connectors(),
        Duration::from_millis(config.arbitrage.quote_timeout_ms),
        clock,
    );
    Ok(ArbitrageEngine::new(
        ArbitrageDetector::new(config.arbitrage.detection_mode),
        Arc::new(oracle),
        Arc::new(build_fee_schedule(config)?),
        Arc::new(config.risk_policy()),
        engine_settings(config),
    ))
}

/// Build the full engine: detection plus the execution pool.
///
/// # Errors
///
/// Returns an error if an exchange or fee entry is unknown, or the audit
/// file cannot be opened.
#[allow(clippy::result_large_err)]
pub fn build_engine(config: &Config) -> Result<ArbitrageEngine> {
    let registry = ExchangeRegistry::from_config(config)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier: Arc<dyn Notifier> = Arc::new(build_notifier_registry(config));
    let policy = Arc::new(config.risk_policy());

    let engine = detection_engine(config, &registry, Arc::clone(&clock))?;

    let coordinator = ExecutionCoordinator::new(
        Arc::clone(&policy),
        Arc::new(registry),
        Arc::new(StaticConditions::new(config.market.conditions())),
    )
    .with_cooldown(Arc::new(CooldownTracker::new(
        config.execution.cooldown_scope,
    )))
    .with_retry(config.execution.retry(&policy))
    .with_settings(config.execution.settings())
    .with_notifier(Arc::clone(&notifier))
    .with_audit(build_audit_sink(config)?)
    .with_clock(clock);

    let pool = ExecutionPool::new(Arc::new(coordinator), config.execution.max_concurrent);
    info!(
        max_concurrent = config.execution.max_concurrent,
        cooldown_scope = ?config.execution.cooldown_scope,
        "Execution pool ready"
    );

    Ok(engine.with_pool(Arc::new(pool)).with_notifier(notifier))
}
