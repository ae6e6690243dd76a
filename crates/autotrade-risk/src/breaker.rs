//! Circuit breaker state machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use autotrade_core::error::{DataError, RiskError};
use autotrade_core::traits::{Notifier, PipelineEvent, PortfolioStore};
use autotrade_core::types::RiskStatus;
use autotrade_ledger::{LedgerSnapshot, PositionLedger};

use crate::RiskThresholds;

struct BreakerState {
    status: RiskStatus,
    /// Highest equity observed, for drawdown
    peak_equity: Decimal,
}

/// Per-portfolio risk gate. Sole writer of `RiskStatus`.
///
/// `evaluate` may trip the breaker but never clears it; `reset` is the
/// explicit re-evaluation that can clear a halt. If risk inputs cannot be
/// fetched, both fail safe: the stored status is left untouched and the
/// error is surfaced to the caller.
pub struct CircuitBreaker {
    thresholds: RiskThresholds,
    portfolios: Arc<dyn PortfolioStore>,
    ledger: Arc<PositionLedger>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<HashMap<String, BreakerState>>,
}

impl CircuitBreaker {
    pub fn new(
        thresholds: RiskThresholds,
        portfolios: Arc<dyn PortfolioStore>,
        ledger: Arc<PositionLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            thresholds,
            portfolios,
            ledger,
            notifier,
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Evaluate the portfolio's risk state.
    ///
    /// Trips the breaker on a breach. An existing halt is never cleared
    /// here, regardless of how the bounds look now.
    pub async fn evaluate(
        &self,
        portfolio_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RiskStatus, RiskError> {
        let (initial_capital, equity, snapshot) = self.fetch_risk_inputs(portfolio_id).await?;

        let mut state = self.state.write().unwrap();
        let entry = state
            .entry(portfolio_id.to_string())
            .or_insert_with(|| BreakerState {
                status: RiskStatus::allow(portfolio_id, now),
                // Equity history starts at the initial capital
                peak_equity: initial_capital,
            });

        if equity > entry.peak_equity {
            entry.peak_equity = equity;
        }

        if entry.status.is_halted() {
            // Halt stands until an explicit reset
            entry.status.last_evaluated_at = now;
            return Ok(entry.status.clone());
        }

        match self.check_bounds(equity, entry.peak_equity, &snapshot) {
            Some(reason) => {
                warn!(portfolio_id, %reason, "circuit breaker tripped");
                entry.status = RiskStatus::halt(portfolio_id, reason.clone(), now);
                self.notifier.notify(PipelineEvent::CircuitBreakerTripped {
                    portfolio_id: portfolio_id.to_string(),
                    reason,
                });
            }
            None => {
                entry.status = RiskStatus::allow(portfolio_id, now);
            }
        }

        Ok(entry.status.clone())
    }

    /// Explicit reset evaluation.
    ///
    /// Clears the halt only if every bound passes; otherwise the halt
    /// stands with a refreshed reason. This is the only allow-ward
    /// transition; elapsed time alone never clears a halt.
    pub async fn reset(
        &self,
        portfolio_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RiskStatus, RiskError> {
        let (initial_capital, equity, snapshot) = self.fetch_risk_inputs(portfolio_id).await?;

        let mut state = self.state.write().unwrap();
        let entry = state
            .entry(portfolio_id.to_string())
            .or_insert_with(|| BreakerState {
                status: RiskStatus::allow(portfolio_id, now),
                peak_equity: initial_capital,
            });

        if equity > entry.peak_equity {
            entry.peak_equity = equity;
        }

        let was_halted = entry.status.is_halted();
        match self.check_bounds(equity, entry.peak_equity, &snapshot) {
            Some(reason) => {
                warn!(portfolio_id, %reason, "reset evaluation failed, halt stands");
                let tripped_at = entry.status.tripped_at;
                entry.status = RiskStatus::halt(portfolio_id, reason, now);
                if let Some(at) = tripped_at {
                    entry.status.tripped_at = Some(at);
                }
            }
            None => {
                entry.status = RiskStatus::allow(portfolio_id, now);
                if was_halted {
                    info!(portfolio_id, "circuit breaker reset");
                    self.notifier.notify(PipelineEvent::CircuitBreakerReset {
                        portfolio_id: portfolio_id.to_string(),
                    });
                }
            }
        }

        Ok(entry.status.clone())
    }

    /// Last stored status without re-evaluating.
    pub fn status(&self, portfolio_id: &str) -> Option<RiskStatus> {
        let state = self.state.read().unwrap();
        state.get(portfolio_id).map(|entry| entry.status.clone())
    }

    async fn fetch_risk_inputs(
        &self,
        portfolio_id: &str,
    ) -> Result<(Decimal, Decimal, LedgerSnapshot), RiskError> {
        let portfolio = self
            .portfolios
            .get_portfolio(portfolio_id)
            .await
            .map_err(|e| match e {
                DataError::PortfolioNotFound(id) => RiskError::UnknownPortfolio(id),
                other => RiskError::DataUnavailable(other.to_string()),
            })?;

        let snapshot = self.ledger.snapshot(portfolio_id);
        let equity = snapshot.equity(portfolio.initial_capital);
        Ok((portfolio.initial_capital, equity, snapshot))
    }

    fn check_bounds(
        &self,
        equity: Decimal,
        peak_equity: Decimal,
        snapshot: &LedgerSnapshot,
    ) -> Option<String> {
        if equity <= Decimal::ZERO {
            return Some(format!("equity exhausted: {equity:.2}"));
        }

        if peak_equity > Decimal::ZERO {
            let drawdown = (peak_equity - equity) / peak_equity * dec!(100);
            if drawdown >= self.thresholds.max_drawdown_pct {
                return Some(format!(
                    "drawdown {:.2}% breaches limit {:.2}%",
                    drawdown, self.thresholds.max_drawdown_pct
                ));
            }
        }

        let exposure_pct = snapshot.total_exposure() / equity * dec!(100);
        if exposure_pct >= self.thresholds.max_exposure_pct {
            return Some(format!(
                "exposure {:.2}% breaches limit {:.2}%",
                exposure_pct, self.thresholds.max_exposure_pct
            ));
        }

        let concentration_pct = snapshot.max_position_value() / equity * dec!(100);
        if concentration_pct >= self.thresholds.max_concentration_pct {
            return Some(format!(
                "position concentration {:.2}% breaches limit {:.2}%",
                concentration_pct, self.thresholds.max_concentration_pct
            ));
        }

        None
    }
}
