//! End-to-end automation flow tests over the in-process stack.

use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use autotrade_core::traits::{PipelineEvent, PortfolioConfig, SignalStore, StrategyBinding};
use autotrade_core::types::SignalSource;
use autotrade_data::StaticQuotes;
use autotrade_exec::ExecutionCoordinator;
use autotrade_gateway::{MemoryPortfolioStore, PaperGateway};
use autotrade_ledger::PositionLedger;
use autotrade_metrics::MetricsAggregator;
use autotrade_monitor::ChannelNotifier;
use autotrade_risk::{CircuitBreaker, RiskThresholds};
use autotrade_scheduler::{AutomationScheduler, TickPipeline};
use autotrade_signals::{MemorySignalStore, SignalGenerator};

struct Stack {
    quotes: Arc<StaticQuotes>,
    ledger: Arc<PositionLedger>,
    store: Arc<MemorySignalStore>,
    pipeline: Arc<TickPipeline>,
    scheduler: AutomationScheduler,
    events: UnboundedReceiver<PipelineEvent>,
}

fn momentum_portfolio(id: &str, capital: Decimal) -> PortfolioConfig {
    PortfolioConfig {
        id: id.to_string(),
        automated_trading_enabled: true,
        initial_capital: capital,
        strategies: vec![StrategyBinding {
            strategy: "momentum".to_string(),
            symbols: vec!["BTC-USD".to_string()],
            params: serde_json::json!({ "lookback": 2, "entry_threshold_pct": "2" }),
        }],
    }
}

fn stack(portfolio: PortfolioConfig, thresholds: RiskThresholds, tick_interval: Duration) -> Stack {
    let quotes = Arc::new(StaticQuotes::new());
    let ledger = Arc::new(PositionLedger::new());
    let store = Arc::new(MemorySignalStore::new());
    let portfolios = Arc::new(MemoryPortfolioStore::new(vec![portfolio]));
    let (notifier, events) = ChannelNotifier::new();
    let notifier = Arc::new(notifier);

    let gateway = Arc::new(PaperGateway::new(quotes.clone()).with_slippage(Decimal::ZERO));
    let generator = Arc::new(SignalGenerator::new(
        portfolios.clone(),
        quotes.clone(),
        store.clone(),
        ledger.clone(),
        60,
    ));
    let breaker = Arc::new(CircuitBreaker::new(
        thresholds,
        portfolios.clone(),
        ledger.clone(),
        notifier.clone(),
    ));
    let coordinator = Arc::new(ExecutionCoordinator::new(
        gateway,
        quotes.clone(),
        ledger.clone(),
        store.clone(),
        notifier.clone(),
        dec!(1000),
        Duration::from_secs(5),
    ));
    let metrics = Arc::new(MetricsAggregator::new(store.clone()));

    let pipeline = Arc::new(TickPipeline::new(
        generator,
        breaker,
        coordinator,
        metrics,
        store.clone(),
        ChronoDuration::hours(24),
    ));
    let scheduler = AutomationScheduler::new(
        pipeline.clone(),
        portfolios,
        notifier,
        tick_interval,
    );

    Stack {
        quotes,
        ledger,
        store,
        pipeline,
        scheduler,
        events,
    }
}

fn wide_open_thresholds() -> RiskThresholds {
    RiskThresholds {
        max_drawdown_pct: dec!(90),
        max_exposure_pct: dec!(500),
        max_concentration_pct: dec!(500),
    }
}

fn seed_rising_market(quotes: &StaticQuotes) {
    quotes.push("BTC-USD", dec!(96), Utc::now() - ChronoDuration::minutes(2));
    quotes.push("BTC-USD", dec!(98), Utc::now() - ChronoDuration::minutes(1));
    quotes.push("BTC-USD", dec!(100), Utc::now());
}

async fn wait_for_batch(events: &mut UnboundedReceiver<PipelineEvent>) -> (usize, usize) {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), events.recv())
            .await
            .expect("timed out waiting for a batch event")
            .expect("event channel closed");
        if let PipelineEvent::BatchCompleted {
            executed, failed, ..
        } = event
        {
            return (executed, failed);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_tick_generates_and_executes() {
    let mut s = stack(
        momentum_portfolio("p1", dec!(100000)),
        wide_open_thresholds(),
        Duration::from_millis(50),
    );
    seed_rising_market(&s.quotes);

    let started = s.scheduler.start().await.unwrap();
    assert_eq!(started, 1);
    assert!(s.scheduler.is_running("p1"));

    // First tick: the momentum buy executes
    loop {
        let (executed, failed) = wait_for_batch(&mut s.events).await;
        assert_eq!(failed, 0);
        if executed == 1 {
            break;
        }
    }

    let position = s.ledger.position("p1", "BTC-USD").unwrap();
    assert_eq!(position.quantity, dec!(10)); // $1000 notional at $100

    s.scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_disable_stops_scheduling() {
    let mut s = stack(
        momentum_portfolio("p1", dec!(100000)),
        wide_open_thresholds(),
        Duration::from_millis(50),
    );
    seed_rising_market(&s.quotes);

    s.scheduler.start().await.unwrap();
    wait_for_batch(&mut s.events).await;

    s.scheduler.disable("p1").await.unwrap();
    assert!(!s.scheduler.is_running("p1"));

    // Let an in-flight tick finish, drain its events, then verify silence
    tokio::time::sleep(Duration::from_millis(500)).await;
    while s.events.try_recv().is_ok() {}
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(s.events.try_recv().is_err());
}

#[tokio::test]
async fn test_breaker_trip_halts_execution_but_not_generation() {
    let thresholds = RiskThresholds {
        max_drawdown_pct: dec!(20),
        max_exposure_pct: dec!(90),
        max_concentration_pct: dec!(95),
    };
    let s = stack(
        momentum_portfolio("p1", dec!(2000)),
        thresholds,
        Duration::from_secs(3600),
    );
    seed_rising_market(&s.quotes);

    // Tick 1: buy executes, 10 units at $100
    let t0 = Utc::now();
    let report = s
        .pipeline
        .run_tick("p1", t0, SignalSource::Automated, false)
        .await
        .unwrap();
    assert!(!report.risk.is_halted());
    assert_eq!(report.execution.unwrap().executed, 1);
    assert!(s.ledger.position("p1", "BTC-USD").is_some());

    // Market crashes: equity 2000 -> 1500, drawdown 25%
    s.quotes.set_price("BTC-USD", dec!(50));

    // Tick 2: breaker trips; the sell signal is still generated but nothing
    // executes and the position stays open
    let t1 = t0 + ChronoDuration::minutes(5);
    let report = s
        .pipeline
        .run_tick("p1", t1, SignalSource::Automated, false)
        .await
        .unwrap();
    assert!(report.risk.is_halted());
    assert!(report.risk.reason().contains("drawdown"));
    assert_eq!(report.generated.len(), 1);
    assert!(report.execution.is_none());
    assert!(s.ledger.position("p1", "BTC-USD").is_some());
    assert_eq!(s.store.pending("p1").await.unwrap().len(), 1);

    // Tick 3: the halt is sticky, still nothing executes. Generation keeps
    // going, so a second exit signal piles up pending.
    let t2 = t0 + ChronoDuration::minutes(10);
    let report = s
        .pipeline
        .run_tick("p1", t2, SignalSource::Automated, false)
        .await
        .unwrap();
    assert!(report.risk.is_halted());
    assert!(report.execution.is_none());
    assert_eq!(s.store.pending("p1").await.unwrap().len(), 2);

    // Reset while still breached: the halt stands
    let status = s.pipeline.reset_risk("p1", t2).await.unwrap();
    assert!(status.is_halted());

    // Market recovers; an explicit reset clears the breaker
    s.quotes.set_price("BTC-USD", dec!(100));
    let t3 = t0 + ChronoDuration::minutes(15);
    let status = s.pipeline.reset_risk("p1", t3).await.unwrap();
    assert!(!status.is_halted());

    // Tick 4: the first pending sell closes the position; the duplicate
    // exit finds nothing left to close and fails in isolation
    let report = s
        .pipeline
        .run_tick("p1", t3, SignalSource::Automated, false)
        .await
        .unwrap();
    let execution = report.execution.unwrap();
    assert_eq!(execution.executed, 1);
    assert_eq!(execution.failed, 1);
    assert!(s.ledger.position("p1", "BTC-USD").is_none());
    assert_eq!(s.store.pending("p1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_manual_preview_and_execute() {
    let s = stack(
        momentum_portfolio("p1", dec!(100000)),
        wide_open_thresholds(),
        Duration::from_secs(3600),
    );
    seed_rising_market(&s.quotes);

    // Preview: signals are persisted pending, nothing executes
    let previewed = s.scheduler.generate_once("p1").await.unwrap();
    assert_eq!(previewed.len(), 1);
    assert!(!previewed[0].executed);
    assert_eq!(previewed[0].source, SignalSource::Manual);
    assert!(s.ledger.position("p1", "BTC-USD").is_none());

    // Execute: the pending preview signal is picked up and filled
    let report = s.scheduler.execute_once("p1", false).await.unwrap();
    assert_eq!(report.execution.unwrap().executed, 1);
    assert!(s.ledger.position("p1", "BTC-USD").is_some());
}

#[tokio::test]
async fn test_dry_run_execute_once_leaves_state_untouched() {
    let s = stack(
        momentum_portfolio("p1", dec!(100000)),
        wide_open_thresholds(),
        Duration::from_secs(3600),
    );
    seed_rising_market(&s.quotes);

    let report = s.scheduler.execute_once("p1", true).await.unwrap();
    let execution = report.execution.unwrap();
    assert!(execution.dry_run);
    assert_eq!(execution.executed, 1);

    // The signal is still pending and the ledger never moved
    assert_eq!(s.store.pending("p1").await.unwrap().len(), 1);
    assert!(s.ledger.position("p1", "BTC-USD").is_none());
}
