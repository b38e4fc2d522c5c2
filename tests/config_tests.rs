//! Configuration loading from files, including the shipped example.

mod support;

use std::path::Path;

use crossarb::application::execution::BackoffKind;
use crossarb::application::risk::CooldownScope;
use crossarb::application::DetectionMode;
use crossarb::domain::ExchangeId;
use crossarb::error::{ConfigError, Error};
use crossarb::infrastructure::bootstrap::{build_audit_sink, build_fee_schedule};
use crossarb::infrastructure::config::settings::Config;
use crossarb::infrastructure::exchange::ExchangeRegistry;
use rust_decimal_macros::dec;

use support::config::{write_config, TWO_EXCHANGES};

fn example_path() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.toml"))
}

#[test]
fn example_config_is_valid() {
    let config = Config::load(example_path()).expect("example config loads");

    assert_eq!(config.arbitrage.symbols, vec!["BTC/USDT", "ETH/USDT"]);
    assert_eq!(config.arbitrage.detection_mode, DetectionMode::Pairwise);
    assert!(!config.arbitrage.trade_execution_enabled);
    assert_eq!(config.execution.cooldown_scope, CooldownScope::Global);
    assert_eq!(config.execution.backoff, BackoffKind::Fixed);
    assert_eq!(config.risk_policy(), crossarb::domain::RiskPolicy::default());

    let registry = ExchangeRegistry::from_config(&config).unwrap();
    let ids: Vec<_> = registry.ids().map(ExchangeId::as_str).collect();
    assert_eq!(ids, vec!["binance", "kraken"]);

    let fees = build_fee_schedule(&config).unwrap();
    let kraken = ExchangeId::from("kraken");
    assert_eq!(fees.trading_fee_percent(&kraken), dec!(0.16));
    assert_eq!(fees.withdrawal_fee_percent(&kraken, "BTC"), dec!(0.02));
    assert_eq!(fees.withdrawal_fee_percent(&kraken, "ETH"), dec!(0));
}

#[test]
fn load_reads_a_file_from_disk() {
    let (_dir, path) = write_config(TWO_EXCHANGES);

    let config = Config::load(&path).unwrap();

    assert_eq!(config.enabled_exchanges().count(), 2);
    assert_eq!(config.symbols().len(), 1);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = Config::load(dir.path().join("nope.toml")).unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let (_dir, path) = write_config("[arbitrage\nsymbols = 3");

    let err = Config::load(&path).unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
}

#[test]
fn out_of_range_risk_value_is_rejected() {
    let toml = format!("{TWO_EXCHANGES}\n[risk]\nmax_exposure_percent = 150\n");
    let (_dir, path) = write_config(&toml);

    let err = Config::load(&path).unwrap_err();

    assert!(err.to_string().contains("max_exposure_percent"), "{err}");
}

#[test]
fn audit_sink_creates_the_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let audit = dir.path().join("logs").join("audit.jsonl");
    let toml = format!(
        "{TWO_EXCHANGES}\n[execution]\naudit_path = \"{}\"\n",
        audit.display()
    );
    let config = Config::parse_toml(&toml).unwrap();

    build_audit_sink(&config).unwrap();

    assert!(audit.exists());
}

#[test]
fn empty_audit_path_disables_the_audit_log() {
    let toml = format!("{TWO_EXCHANGES}\n[execution]\naudit_path = \"\"\n");
    let config = Config::parse_toml(&toml).unwrap();

    assert_eq!(config.execution.audit_path(), None);
    assert!(build_audit_sink(&config).is_ok());
}
