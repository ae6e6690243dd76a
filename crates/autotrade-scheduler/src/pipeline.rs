//! One tick of the evaluation pipeline.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

use autotrade_core::error::PipelineError;
use autotrade_core::traits::SignalStore;
use autotrade_core::types::{
    PerformanceMetrics, RiskStatus, SignalSource, TimeWindow, TradingSignal,
};
use autotrade_exec::{ExecutionCoordinator, ExecutionResult};
use autotrade_metrics::MetricsAggregator;
use autotrade_risk::CircuitBreaker;
use autotrade_signals::SignalGenerator;

/// Everything one tick produced.
#[derive(Debug)]
pub struct TickReport {
    pub portfolio_id: String,
    pub risk: RiskStatus,
    /// Signals newly emitted this tick
    pub generated: Vec<TradingSignal>,
    /// Execution outcome; `None` when the circuit breaker halted execution
    pub execution: Option<ExecutionResult>,
    pub metrics: PerformanceMetrics,
}

/// Runs the fixed tick order: risk evaluation, signal generation, execution
/// (unless halted), metrics.
///
/// Callers hold the portfolio's exclusion token across the whole call; the
/// pipeline itself is stateless between ticks.
pub struct TickPipeline {
    generator: Arc<SignalGenerator>,
    breaker: Arc<CircuitBreaker>,
    coordinator: Arc<ExecutionCoordinator>,
    metrics: Arc<MetricsAggregator>,
    signals: Arc<dyn SignalStore>,
    metrics_window: Duration,
}

impl TickPipeline {
    pub fn new(
        generator: Arc<SignalGenerator>,
        breaker: Arc<CircuitBreaker>,
        coordinator: Arc<ExecutionCoordinator>,
        metrics: Arc<MetricsAggregator>,
        signals: Arc<dyn SignalStore>,
        metrics_window: Duration,
    ) -> Self {
        Self {
            generator,
            breaker,
            coordinator,
            metrics,
            signals,
            metrics_window,
        }
    }

    /// Run one full tick for a portfolio.
    ///
    /// Executes the pending backlog (including signals whose submission
    /// failed on an earlier tick), so transient failures retry exactly once
    /// per tick, never in a tight loop.
    pub async fn run_tick(
        &self,
        portfolio_id: &str,
        as_of: DateTime<Utc>,
        source: SignalSource,
        dry_run: bool,
    ) -> Result<TickReport, PipelineError> {
        self.coordinator.refresh_prices(portfolio_id).await;

        let risk = self.breaker.evaluate(portfolio_id, as_of).await?;
        let generated = self.generator.generate(portfolio_id, as_of, source).await?;

        let execution = if risk.is_halted() {
            info!(
                portfolio_id,
                reason = risk.reason(),
                "circuit breaker active, skipping execution"
            );
            None
        } else {
            let batch = self.signals.pending(portfolio_id).await?;
            Some(
                self.coordinator
                    .execute_signals(portfolio_id, batch, &risk, dry_run)
                    .await?,
            )
        };

        let metrics = self
            .metrics
            .compute(portfolio_id, TimeWindow::trailing(as_of, self.metrics_window))
            .await?;

        Ok(TickReport {
            portfolio_id: portfolio_id.to_string(),
            risk,
            generated,
            execution,
            metrics,
        })
    }

    /// Generate signals without executing anything (operator preview).
    pub async fn generate_only(
        &self,
        portfolio_id: &str,
        as_of: DateTime<Utc>,
        source: SignalSource,
    ) -> Result<Vec<TradingSignal>, PipelineError> {
        self.coordinator.refresh_prices(portfolio_id).await;
        Ok(self.generator.generate(portfolio_id, as_of, source).await?)
    }

    /// Explicit circuit-breaker reset evaluation.
    pub async fn reset_risk(
        &self,
        portfolio_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<RiskStatus, PipelineError> {
        self.coordinator.refresh_prices(portfolio_id).await;
        Ok(self.breaker.reset(portfolio_id, as_of).await?)
    }
}
