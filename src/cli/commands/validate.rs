//! Validate configuration command.

use anyhow::Result;
use std::path::Path;

use autotrade_config::load_config;
use autotrade_strategies::StrategyRegistry;
use rust_decimal::Decimal;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let registry = StrategyRegistry::new();
    let mut problems = Vec::new();

    for portfolio in &config.portfolios {
        if portfolio.id.is_empty() {
            problems.push("portfolio with empty id".to_string());
        }
        if portfolio.initial_capital <= Decimal::ZERO {
            problems.push(format!(
                "portfolio {}: initial_capital must be positive",
                portfolio.id
            ));
        }
        for binding in &portfolio.strategies {
            if !registry.exists(&binding.strategy) {
                problems.push(format!(
                    "portfolio {}: unknown strategy '{}'",
                    portfolio.id, binding.strategy
                ));
            }
            if binding.symbols.is_empty() {
                problems.push(format!(
                    "portfolio {}: strategy '{}' has no symbols",
                    portfolio.id, binding.strategy
                ));
            }
        }
    }

    if !problems.is_empty() {
        println!("Configuration problems:");
        for problem in &problems {
            println!("  - {}", problem);
        }
        anyhow::bail!("{} configuration problem(s)", problems.len());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Tick interval: {}s", config.scheduler.tick_interval_secs);
    println!("Max drawdown: {}%", config.risk.max_drawdown_pct);
    println!("Max exposure: {}%", config.risk.max_exposure_pct);
    println!("Max concentration: {}%", config.risk.max_concentration_pct);
    println!("Portfolios: {}", config.portfolios.len());

    Ok(())
}
