//! End-to-end engine tests over paper exchanges built from configuration.

mod support;

use std::sync::Arc;
use std::time::Duration;

use crossarb::application::{
    ArbitrageDetector, ArbitrageEngine, CycleOutcome, DetectionMode, EngineSettings,
};
use crossarb::domain::{AuditRecord, ExecutionState, FeeSchedule, Symbol};
use crossarb::infrastructure::bootstrap::build_engine;
use crossarb::infrastructure::config::settings::Config;
use crossarb::port::outbound::notifier::Event;
use crossarb::testkit::domain::{epoch, instant_policy};
use crossarb::testkit::market::StaticOracle;
use crossarb::testkit::notifier::RecordingNotifier;
use rust_decimal_macros::dec;
use tokio::sync::watch;

fn paper_config(audit_path: &str, trading_enabled: bool) -> Config {
    Config::parse_toml(&format!(
        r#"
[arbitrage]
symbols = ["BTC/USDT", "ETH/USDT"]
poll_interval_ms = 500
trade_execution_enabled = {trading_enabled}
trade_size = 1
portfolio_value = 10

[risk]
cooldown_seconds = 3600
retry_backoff_seconds = 0
max_transfer_seconds = 0

[execution]
audit_path = "{audit_path}"

[exchanges.binance]
paper_price = 100
paper_volatility_percent = 0

[exchanges.kraken]
paper_price = 102
paper_volatility_percent = 0
"#
    ))
    .expect("valid config")
}

fn read_audit(path: &std::path::Path) -> Vec<AuditRecord> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).expect("audit line is JSON"))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn engine_trades_paper_spread_and_stops_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let config = paper_config(&audit_path.display().to_string(), true);

    let engine = Arc::new(build_engine(&config).expect("engine"));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(Arc::clone(&engine).run(shutdown_rx));

    tokio::time::sleep(Duration::from_millis(1600)).await;
    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(60), handle)
        .await
        .expect("engine stops after shutdown")
        .unwrap();

    let records = read_audit(&audit_path);
    let completed: Vec<_> = records
        .iter()
        .filter(|r| r.state == ExecutionState::Completed)
        .collect();
    // The global cooldown admits one trade; every later attempt is rejected.
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].realized_pnl, Some(dec!(2)));
    assert!(records.len() > 1);
    assert!(records
        .iter()
        .filter(|r| r.state != ExecutionState::Completed)
        .all(|r| r.state == ExecutionState::RiskRejected));
}

#[tokio::test(start_paused = true)]
async fn kill_switch_keeps_the_engine_detection_only() {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let config = paper_config(&audit_path.display().to_string(), false);

    let engine = Arc::new(build_engine(&config).expect("engine"));
    let outcome = engine.run_cycle(&Symbol::from("BTC/USDT")).await;

    let CycleOutcome::ExecutionDisabled(opp) = outcome else {
        panic!("expected detection only, got {outcome:?}");
    };
    assert_eq!(opp.buy_exchange().as_str(), "binance");
    assert_eq!(opp.sell_exchange().as_str(), "kraken");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(Arc::clone(&engine).run(shutdown_rx));
    tokio::time::sleep(Duration::from_secs(2)).await;
    drop(shutdown_tx);
    handle.await.unwrap();

    assert!(read_audit(&audit_path).is_empty());
}

#[tokio::test(start_paused = true)]
async fn every_symbol_is_polled_until_shutdown() {
    let oracle = StaticOracle::new(epoch())
        .with("BTC/USDT", &[("binance", dec!(100)), ("kraken", dec!(103))])
        .with("ETH/USDT", &[("okx", dec!(2000)), ("bybit", dec!(2050))]);
    let notifier = RecordingNotifier::new();
    let engine = Arc::new(
        ArbitrageEngine::new(
            ArbitrageDetector::new(DetectionMode::Pairwise),
            Arc::new(oracle),
            Arc::new(FeeSchedule::new()),
            Arc::new(instant_policy()),
            EngineSettings {
                symbols: vec![Symbol::from("BTC/USDT"), Symbol::from("ETH/USDT")],
                poll_interval: Duration::from_secs(1),
                trade_size: dec!(1),
                portfolio_value: dec!(10),
                trade_execution_enabled: true,
            },
        )
        .with_notifier(Arc::new(notifier.clone())),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(Arc::clone(&engine).run(shutdown_rx));
    // Ticks at 0s, 1s and 2s for each symbol.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    let detected: Vec<String> = notifier
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::OpportunityDetected(o) => Some(o.symbol),
            _ => None,
        })
        .collect();
    assert_eq!(detected.iter().filter(|s| *s == "BTC/USDT").count(), 3);
    assert_eq!(detected.iter().filter(|s| *s == "ETH/USDT").count(), 3);
}
