//! Command-line interface definitions.
//!
//! Defines the CLI structure using `clap`: `run` starts the engine, `scan`
//! runs a single detection cycle, and `check` validates configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fee-adjusted cross-exchange arbitrage detection and execution
#[derive(Parser, Debug)]
#[command(name = "crossarb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the detection loop and execute opportunities (foreground)
    Run(RunArgs),

    /// Take one snapshot per symbol and print what the detector finds
    Scan(ScanArgs),

    /// Validate configuration and the exchange registry
    Check(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,

    /// Detect opportunities but don't execute trades
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `scan` subcommand.
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Scan only this symbol instead of every configured one
    #[arg(short, long)]
    pub symbol: Option<String>,
}
