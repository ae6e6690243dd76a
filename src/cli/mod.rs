//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autotrade")]
#[command(author, version, about = "Automated trading signal and execution pipeline")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the automation scheduler for all enabled portfolios
    Run,
    /// Generate signals for a portfolio without executing (preview)
    Generate(PortfolioArgs),
    /// Generate and execute signals for a portfolio
    Execute(ExecuteArgs),
    /// Toggle automated trading for a portfolio
    Automation(AutomationArgs),
    /// Re-evaluate risk bounds and clear the circuit breaker if they pass
    ResetRisk(PortfolioArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct PortfolioArgs {
    /// Portfolio to operate on
    #[arg(short, long)]
    pub portfolio: String,
}

#[derive(clap::Args)]
pub struct ExecuteArgs {
    /// Portfolio to operate on
    #[arg(short, long)]
    pub portfolio: String,

    /// Walk the execution path without submitting orders
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct AutomationArgs {
    /// Portfolio to operate on
    #[arg(short, long)]
    pub portfolio: String,

    /// Desired automation state
    #[arg(value_enum)]
    pub state: AutomationState,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AutomationState {
    On,
    Off,
}
