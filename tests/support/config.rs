use std::path::PathBuf;

use tempfile::TempDir;

/// Two fixed-price paper exchanges two percent apart.
pub const TWO_EXCHANGES: &str = r#"
[arbitrage]
symbols = ["BTC/USDT"]

[exchanges.binance]
paper_price = 100
paper_volatility_percent = 0

[exchanges.kraken]
paper_price = 102
paper_volatility_percent = 0
"#;

/// Write `contents` to `config.toml` in a fresh temporary directory.
///
/// The directory lives as long as the returned guard.
pub fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).expect("write temp config");
    (dir, path)
}
