//! Automated trading pipeline CLI.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use autotrade_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level {
        cli::LogLevel::Trace => "trace",
        cli::LogLevel::Debug => "debug",
        cli::LogLevel::Info => "info",
        cli::LogLevel::Warn => "warn",
        cli::LogLevel::Error => "error",
    };
    setup_logging(log_level, cli.json_logs);

    // Execute command
    match cli.command {
        Commands::Run => cli::commands::run::run(&cli.config).await,
        Commands::Generate(args) => cli::commands::generate::run(args, &cli.config).await,
        Commands::Execute(args) => cli::commands::execute::run(args, &cli.config).await,
        Commands::Automation(args) => cli::commands::automation::run(args, &cli.config).await,
        Commands::ResetRisk(args) => cli::commands::reset_risk::run(args, &cli.config).await,
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
