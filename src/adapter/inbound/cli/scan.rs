//! Handler for the `scan` command.

use serde_json::json;

use super::command::ScanArgs;
use super::output;
use crate::application::detector::DetectionOutcome;
use crate::application::engine::ScanReport;
use crate::domain::Symbol;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_scanner;
use crate::infrastructure::config::settings::Config;

/// Execute the scan command: one detection cycle per symbol, no trading.
pub async fn execute(args: &ScanArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    config.init_logging();

    let symbols = match &args.symbol {
        Some(symbol) => vec![Symbol::from(symbol.as_str())],
        None => config.symbols(),
    };
    let scanner = build_scanner(&config)?;

    output::header(env!("CARGO_PKG_VERSION"));
    for symbol in &symbols {
        let report = scanner.scan(symbol).await;
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ScanReport) {
    let snapshot = &report.snapshot;
    output::json_payload(
        "scan",
        json!({
            "symbol": snapshot.symbol().as_str(),
            "taken_at": snapshot.taken_at(),
            "quotes": snapshot
                .iter()
                .map(|(exchange, quote)| (exchange.as_str().to_string(), quote.price.to_string()))
                .collect::<std::collections::BTreeMap<_, _>>(),
            "outcome": describe(&report.outcome),
        }),
    );
    if output::is_json() {
        return;
    }

    output::section(snapshot.symbol().as_str());
    for (exchange, quote) in snapshot.iter() {
        output::field(exchange.as_str(), quote.price);
    }
    match &report.outcome {
        DetectionOutcome::Opportunity(opportunity) => {
            output::success(&opportunity.to_string());
        }
        outcome => output::field("Result", describe(outcome)),
    }
}

fn describe(outcome: &DetectionOutcome) -> String {
    match outcome {
        DetectionOutcome::Opportunity(opportunity) => opportunity.to_string(),
        DetectionOutcome::InsufficientData { available } => {
            format!("insufficient data ({available} quote(s))")
        }
        DetectionOutcome::BelowThreshold {
            buy_exchange,
            sell_exchange,
            net_profit_percent,
        } => format!(
            "no opportunity (best {buy_exchange} -> {sell_exchange} at {}%)",
            net_profit_percent.round_dp(4)
        ),
    }
}
