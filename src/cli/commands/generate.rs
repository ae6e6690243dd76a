//! Signal preview command.

use anyhow::Result;
use std::path::Path;

use crate::cli::PortfolioArgs;

use super::build_stack;

pub async fn run(args: PortfolioArgs, config_path: &Path) -> Result<()> {
    let stack = build_stack(config_path)?;

    let signals = stack.scheduler.generate_once(&args.portfolio).await?;

    if signals.is_empty() {
        println!("No new signals for portfolio {}.", args.portfolio);
        return Ok(());
    }

    println!("Generated {} signal(s):", signals.len());
    for signal in &signals {
        println!(
            "  {} {} {} @ {} [{:?}] ({})",
            signal.strategy_id,
            signal.signal_type,
            signal.symbol,
            signal.price,
            signal.strength,
            signal.id,
        );
    }
    println!();
    println!("Signals are pending; run `autotrade execute` to submit them.");

    Ok(())
}
