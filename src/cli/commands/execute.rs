//! Generate-and-execute command.

use anyhow::Result;
use std::path::Path;

use crate::cli::ExecuteArgs;

use super::build_stack;

pub async fn run(args: ExecuteArgs, config_path: &Path) -> Result<()> {
    let stack = build_stack(config_path)?;

    let report = stack
        .scheduler
        .execute_once(&args.portfolio, args.dry_run)
        .await?;

    println!("Portfolio {}", report.portfolio_id);
    println!("  Generated: {}", report.generated.len());

    match &report.execution {
        Some(result) => {
            println!(
                "  Executed:  {} / {} examined{}",
                result.executed,
                result.examined,
                if result.dry_run { " (dry run)" } else { "" }
            );
            for failure in &result.errors {
                println!("    failed {}: {}", failure.symbol, failure.error);
            }
        }
        None => {
            println!(
                "  Execution halted by circuit breaker: {}",
                report.risk.reason()
            );
        }
    }

    let m = &report.metrics;
    println!("  Metrics (trailing window):");
    println!("    signals:        {} ({} executed)", m.total_signals, m.executed_signals);
    println!("    success rate:   {:.1}%", m.success_rate);
    println!("    win rate:       {:.1}%", m.win_rate);
    println!("    profit factor:  {}", m.profit_factor);
    println!("    net P&L:        {}", m.net_pnl);
    println!("    strategies:     {}", m.active_strategies_count);

    Ok(())
}
