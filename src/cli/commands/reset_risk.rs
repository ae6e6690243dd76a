//! Circuit-breaker reset command.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use crate::cli::PortfolioArgs;

use super::build_stack;

pub async fn run(args: PortfolioArgs, config_path: &Path) -> Result<()> {
    let stack = build_stack(config_path)?;

    let status = stack.pipeline.reset_risk(&args.portfolio, Utc::now()).await?;

    if status.is_halted() {
        println!(
            "Circuit breaker for {} is still open: {}",
            args.portfolio,
            status.reason()
        );
    } else {
        println!(
            "Circuit breaker for {} is closed; automated execution allowed.",
            args.portfolio
        );
    }

    Ok(())
}
