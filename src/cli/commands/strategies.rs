//! List strategies command.

use anyhow::Result;
use autotrade_strategies::StrategyRegistry;

pub async fn run() -> Result<()> {
    let registry = StrategyRegistry::new();

    println!("Available Strategies");
    println!("═══════════════════════════════════════════════════════════");
    println!();

    for info in registry.list() {
        println!("  {} ", info.name);
        println!("  ───────────────────────────────────────────────────────");
        println!("  {}", info.description);
        println!();
    }

    println!("Attach a strategy to a portfolio in the configuration file:");
    println!();
    println!("  [[portfolios.strategies]]");
    println!("  strategy = \"momentum\"");
    println!("  symbols = [\"BTC-USD\"]");

    Ok(())
}
