//! Metrics computation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;

use autotrade_core::error::SignalError;
use autotrade_core::traits::SignalStore;
use autotrade_core::types::{PerformanceMetrics, ProfitFactor, TimeWindow, TradingSignal};

/// Compute performance metrics from a slice of signals.
///
/// Empty history yields all-zero metrics; no division happens on empty
/// denominators. Win rate is taken only over executed signals whose
/// profit_loss has resolved; the strategy count ignores execution outcome.
pub fn compute_metrics(signals: &[TradingSignal]) -> PerformanceMetrics {
    let total_signals = signals.len() as u64;
    let executed_signals = signals.iter().filter(|s| s.executed).count() as u64;

    let success_rate = if total_signals > 0 {
        Decimal::from(executed_signals) / Decimal::from(total_signals) * dec!(100)
    } else {
        Decimal::ZERO
    };

    let mut resolved = 0u64;
    let mut wins = 0u64;
    let mut gross_profit = Decimal::ZERO;
    let mut gross_loss = Decimal::ZERO;
    let mut net_pnl = Decimal::ZERO;

    for signal in signals.iter().filter(|s| s.executed) {
        let Some(pnl) = signal.resolved_profit_loss() else {
            continue;
        };
        resolved += 1;
        net_pnl += pnl;
        if pnl > Decimal::ZERO {
            wins += 1;
            gross_profit += pnl;
        } else if pnl < Decimal::ZERO {
            gross_loss += pnl.abs();
        }
    }

    let win_rate = if resolved > 0 {
        Decimal::from(wins) / Decimal::from(resolved) * dec!(100)
    } else {
        Decimal::ZERO
    };

    let active_strategies_count = signals
        .iter()
        .map(|s| s.strategy_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;

    PerformanceMetrics {
        total_signals,
        executed_signals,
        success_rate,
        win_rate,
        profit_factor: ProfitFactor::from_sums(gross_profit, gross_loss),
        net_pnl,
        active_strategies_count,
    }
}

/// Recomputes rolling metrics from the signal store.
pub struct MetricsAggregator {
    signals: Arc<dyn SignalStore>,
}

impl MetricsAggregator {
    pub fn new(signals: Arc<dyn SignalStore>) -> Self {
        Self { signals }
    }

    /// Compute metrics for the portfolio over the given window.
    pub async fn compute(
        &self,
        portfolio_id: &str,
        window: TimeWindow,
    ) -> Result<PerformanceMetrics, SignalError> {
        let signals = self.signals.in_window(portfolio_id, window).await?;
        Ok(compute_metrics(&signals))
    }
}
