//! CLI command implementations.

pub mod automation;
pub mod execute;
pub mod generate;
pub mod reset_risk;
pub mod run;
pub mod strategies;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use autotrade_config::{load_config, MarketDataSource};
use autotrade_core::traits::{MarketData, Notifier};
use autotrade_data::{CsvReplaySource, StaticQuotes};
use autotrade_exec::ExecutionCoordinator;
use autotrade_gateway::{MemoryPortfolioStore, PaperGateway};
use autotrade_ledger::PositionLedger;
use autotrade_metrics::MetricsAggregator;
use autotrade_monitor::LogNotifier;
use autotrade_risk::CircuitBreaker;
use autotrade_scheduler::{AutomationScheduler, TickPipeline};
use autotrade_signals::{MemorySignalStore, SignalGenerator};

/// The assembled pipeline and its collaborators.
pub struct Stack {
    pub pipeline: Arc<TickPipeline>,
    pub scheduler: AutomationScheduler,
}

/// Build the full pipeline from configuration.
pub fn build_stack(config_path: &Path) -> Result<Stack> {
    let config = load_config(config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let market: Arc<dyn MarketData> = match config.market_data.source {
        MarketDataSource::Static => Arc::new(StaticQuotes::new()),
        MarketDataSource::Csv => {
            let path = config
                .market_data
                .csv_path
                .as_ref()
                .context("market_data.csv_path is required for the csv source")?;
            Arc::new(CsvReplaySource::load(path).context("loading csv quotes")?)
        }
    };

    let ledger = Arc::new(PositionLedger::new());
    let signal_store = Arc::new(MemorySignalStore::new());
    let portfolios = Arc::new(MemoryPortfolioStore::new(config.portfolios.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    let gateway = Arc::new(
        PaperGateway::new(market.clone())
            .with_slippage(config.execution.slippage_pct)
            .with_commission(config.execution.commission_per_unit),
    );
    let generator = Arc::new(SignalGenerator::new(
        portfolios.clone(),
        market.clone(),
        signal_store.clone(),
        ledger.clone(),
        config.scheduler.signal_bucket_secs,
    ));
    let breaker = Arc::new(CircuitBreaker::new(
        config.risk.clone(),
        portfolios.clone(),
        ledger.clone(),
        notifier.clone(),
    ));
    let coordinator = Arc::new(ExecutionCoordinator::new(
        gateway,
        market,
        ledger,
        signal_store.clone(),
        notifier.clone(),
        config.execution.order_notional,
        Duration::from_secs(config.scheduler.call_timeout_secs),
    ));
    let metrics = Arc::new(MetricsAggregator::new(signal_store.clone()));

    let pipeline = Arc::new(TickPipeline::new(
        generator,
        breaker,
        coordinator,
        metrics,
        signal_store,
        chrono::Duration::hours(config.scheduler.metrics_window_hours),
    ));
    let scheduler = AutomationScheduler::new(
        pipeline.clone(),
        portfolios,
        notifier,
        Duration::from_secs(config.scheduler.tick_interval_secs),
    );

    Ok(Stack {
        pipeline,
        scheduler,
    })
}
