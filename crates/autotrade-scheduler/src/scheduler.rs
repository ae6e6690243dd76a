//! Per-portfolio automation loops.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use autotrade_core::error::PipelineError;
use autotrade_core::traits::{Notifier, PipelineEvent, PortfolioStore};
use autotrade_core::types::{SignalSource, TradingSignal};

use crate::{TickPipeline, TickReport};

struct PortfolioRunner {
    /// Dropping the sender stops the loop before its next tick
    enabled: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Schedules periodic pipeline ticks, one independent loop per enabled
/// portfolio.
///
/// Manual "generate" and "execute" actions go through the same exclusion
/// token as the scheduled loop, so for any portfolio at most one tick or
/// batch is ever in flight.
pub struct AutomationScheduler {
    pipeline: Arc<TickPipeline>,
    portfolios: Arc<dyn PortfolioStore>,
    notifier: Arc<dyn Notifier>,
    tick_interval: Duration,
    runners: Mutex<HashMap<String, PortfolioRunner>>,
    /// Per-portfolio exclusion tokens, shared with manual invocations
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AutomationScheduler {
    pub fn new(
        pipeline: Arc<TickPipeline>,
        portfolios: Arc<dyn PortfolioStore>,
        notifier: Arc<dyn Notifier>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            pipeline,
            portfolios,
            notifier,
            tick_interval,
            runners: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Start loops for every portfolio whose automation flag is set.
    /// Returns the number of loops started.
    pub async fn start(&self) -> Result<usize, PipelineError> {
        let portfolios = self
            .portfolios
            .list_portfolios()
            .await
            .map_err(PipelineError::Data)?;

        let mut started = 0;
        for portfolio in portfolios {
            if portfolio.automated_trading_enabled {
                self.spawn_runner(&portfolio.id);
                started += 1;
            }
        }

        info!(started, "automation scheduler started");
        Ok(started)
    }

    /// Enable automation for a portfolio: persist the flag and start its
    /// loop if it is not already running.
    pub async fn enable(&self, portfolio_id: &str) -> Result<(), PipelineError> {
        self.portfolios
            .set_automation_enabled(portfolio_id, true)
            .await
            .map_err(PipelineError::Data)?;
        self.spawn_runner(portfolio_id);
        info!(portfolio_id, "automation enabled");
        Ok(())
    }

    /// Disable automation for a portfolio. No further tick is scheduled; an
    /// in-flight tick is allowed to finish.
    pub async fn disable(&self, portfolio_id: &str) -> Result<(), PipelineError> {
        self.portfolios
            .set_automation_enabled(portfolio_id, false)
            .await
            .map_err(PipelineError::Data)?;

        if let Some(runner) = self.runners.lock().unwrap().remove(portfolio_id) {
            // Signal the loop, then let the dropped sender finish the job
            let _ = runner.enabled.send(false);
        }
        info!(portfolio_id, "automation disabled");
        Ok(())
    }

    /// Whether a loop is currently running for the portfolio.
    pub fn is_running(&self, portfolio_id: &str) -> bool {
        self.runners
            .lock()
            .unwrap()
            .get(portfolio_id)
            .map(|runner| !runner.handle.is_finished())
            .unwrap_or(false)
    }

    /// Ad hoc signal generation (operator preview). Serializes with the
    /// scheduled loop through the portfolio's exclusion token.
    pub async fn generate_once(
        &self,
        portfolio_id: &str,
    ) -> Result<Vec<TradingSignal>, PipelineError> {
        let gate = self.gate(portfolio_id);
        let _guard = gate.lock().await;
        self.pipeline
            .generate_only(portfolio_id, Utc::now(), SignalSource::Manual)
            .await
    }

    /// Ad hoc generate-and-execute, sharing the scheduled tick's semantics.
    pub async fn execute_once(
        &self,
        portfolio_id: &str,
        dry_run: bool,
    ) -> Result<TickReport, PipelineError> {
        let gate = self.gate(portfolio_id);
        let _guard = gate.lock().await;
        self.pipeline
            .run_tick(portfolio_id, Utc::now(), SignalSource::Manual, dry_run)
            .await
    }

    /// Stop every loop and wait for in-flight ticks to finish.
    pub async fn shutdown(&self) {
        let runners: Vec<(String, PortfolioRunner)> =
            self.runners.lock().unwrap().drain().collect();

        for (portfolio_id, runner) in runners {
            let _ = runner.enabled.send(false);
            drop(runner.enabled);
            if let Err(error) = runner.handle.await {
                warn!(portfolio_id = %portfolio_id, %error, "automation loop ended abnormally");
            }
        }
        info!("automation scheduler stopped");
    }

    fn gate(&self, portfolio_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self.gates.lock().unwrap();
        gates
            .entry(portfolio_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn spawn_runner(&self, portfolio_id: &str) {
        let mut runners = self.runners.lock().unwrap();
        if let Some(existing) = runners.get(portfolio_id) {
            if !existing.handle.is_finished() {
                debug!(portfolio_id, "automation loop already running");
                return;
            }
        }

        let (enabled, mut enabled_rx) = watch::channel(true);
        let pipeline = self.pipeline.clone();
        let notifier = self.notifier.clone();
        let gate = self.gate(portfolio_id);
        let interval = self.tick_interval;
        let id = portfolio_id.to_string();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = enabled_rx.changed() => {
                        // Disabled or the scheduler dropped the sender
                        if changed.is_err() || !*enabled_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }
                if !*enabled_rx.borrow() {
                    break;
                }

                let _guard = gate.lock().await;
                match pipeline
                    .run_tick(&id, Utc::now(), SignalSource::Automated, false)
                    .await
                {
                    Ok(report) => {
                        debug!(
                            portfolio_id = %id,
                            generated = report.generated.len(),
                            executed = report.execution.as_ref().map(|e| e.executed).unwrap_or(0),
                            halted = report.risk.is_halted(),
                            "tick completed"
                        );
                    }
                    Err(error) => {
                        // One failed tick never stops the loop
                        warn!(portfolio_id = %id, %error, "tick failed");
                        notifier.notify(PipelineEvent::TickFailed {
                            portfolio_id: id.clone(),
                            error: error.to_string(),
                        });
                    }
                }
            }
            debug!(portfolio_id = %id, "automation loop stopped");
        });

        runners.insert(
            portfolio_id.to_string(),
            PortfolioRunner { enabled, handle },
        );
    }
}
