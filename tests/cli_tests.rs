//! CLI integration tests against the built binary.

mod support;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

use support::config::{write_config, TWO_EXCHANGES};

fn crossarb() -> Command {
    cargo_bin_cmd!("crossarb")
}

#[test]
fn test_help_lists_commands() {
    crossarb()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version() {
    crossarb()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crossarb"));
}

#[test]
fn check_accepts_valid_config() {
    let (_dir, path) = write_config(TWO_EXCHANGES);

    crossarb()
        .args(["check", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("binance"))
        .stdout(predicate::str::contains("kraken"))
        .stdout(predicate::str::contains("Configuration check complete"));
}

#[test]
fn check_warns_about_fees_for_disabled_exchanges() {
    let toml = format!("{TWO_EXCHANGES}\n[fees.okx]\ntrading_fee_percent = 0.1\n");
    let (_dir, path) = write_config(&toml);

    crossarb()
        .args(["check", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Fees configured for okx, which is not enabled",
        ));
}

#[test]
fn check_rejects_unknown_exchange() {
    let toml = format!("{TWO_EXCHANGES}\n[exchanges.mtgox]\n");
    let (_dir, path) = write_config(&toml);

    crossarb()
        .args(["check", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exchange: mtgox"));
}

#[test]
fn check_requires_two_enabled_exchanges() {
    let toml = r#"
[exchanges.binance]

[exchanges.kraken]
enabled = false
"#;
    let (_dir, path) = write_config(toml);

    crossarb()
        .args(["check", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value for exchanges"));
}

#[test]
fn check_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    crossarb()
        .args(["check", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn quiet_check_prints_nothing_on_success() {
    let (_dir, path) = write_config(TWO_EXCHANGES);

    crossarb()
        .args(["--quiet", "check", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid").not());
}

#[test]
fn scan_prints_the_opportunity() {
    let (dir, path) = write_config(TWO_EXCHANGES);

    crossarb()
        .current_dir(dir.path())
        .args(["scan", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("BTC/USDT buy binance@100 sell kraken@102"));
}

#[test]
fn scan_json_emits_one_object_per_line() {
    let (dir, path) = write_config(TWO_EXCHANGES);

    let output = crossarb()
        .current_dir(dir.path())
        .args(["--json", "scan", "--symbol", "ETH/USDT", "--config"])
        .arg(&path)
        .output()
        .expect("run crossarb");
    assert!(output.status.success());

    let lines: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect();
    let scans: Vec<&Value> = lines.iter().filter(|v| v["type"] == "scan").collect();

    assert_eq!(scans.len(), 1);
    let payload = &scans[0]["payload"];
    assert_eq!(payload["symbol"], "ETH/USDT");
    assert_eq!(payload["quotes"]["binance"], "100");
    assert_eq!(payload["quotes"]["kraken"], "102");
    assert!(payload["outcome"]
        .as_str()
        .is_some_and(|o| o.contains("buy binance@100 sell kraken@102")));
}

#[test]
fn scan_reports_flat_market_as_no_opportunity() {
    let toml = r#"
[exchanges.binance]
paper_price = 100
paper_volatility_percent = 0

[exchanges.okx]
paper_price = 100
paper_volatility_percent = 0
"#;
    let (dir, path) = write_config(toml);

    crossarb()
        .current_dir(dir.path())
        .args(["scan", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("no opportunity (best binance -> okx"));
}
