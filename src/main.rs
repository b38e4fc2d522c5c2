use clap::Parser;

use crossarb::adapter::inbound::cli::command::{Cli, Commands};
use crossarb::adapter::inbound::cli::output::{self, OutputConfig};
use crossarb::adapter::inbound::cli::{check, run, scan};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    let result = match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Scan(args) => scan::execute(args).await,
        Commands::Check(args) => check::execute(&args.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
