//! Scheduler run command.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::build_stack;

pub async fn run(config_path: &Path) -> Result<()> {
    let stack = build_stack(config_path)?;

    let started = stack.scheduler.start().await?;
    if started == 0 {
        println!("No portfolios have automated trading enabled.");
        println!("Enable one with: autotrade automation --portfolio <id> on");
        return Ok(());
    }

    info!(started, "scheduler running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    info!("shutting down");
    stack.scheduler.shutdown().await;

    Ok(())
}
