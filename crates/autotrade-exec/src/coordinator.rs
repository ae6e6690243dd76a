//! Execution coordinator implementation.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use autotrade_core::error::{ExecutionError, GatewayError};
use autotrade_core::traits::{
    ExchangeGateway, MarketData, Notifier, PipelineEvent, SignalStore,
};
use autotrade_core::types::{
    FillReport, OrderRequest, RiskStatus, SignalType, TradingSignal,
};
use autotrade_ledger::PositionLedger;

/// One signal's submission failure within a batch.
#[derive(Debug, Clone)]
pub struct SignalFailure {
    pub signal_id: Uuid,
    pub symbol: String,
    pub error: String,
}

/// Outcome of one execution batch.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Signals examined, in input order
    pub examined: usize,
    /// Signals executed (or, in a dry run, that would have executed)
    pub executed: usize,
    /// Signals whose submission failed; they remain pending
    pub failed: usize,
    pub errors: Vec<SignalFailure>,
    pub dry_run: bool,
}

/// Executes signal batches against the exchange gateway.
///
/// For one portfolio at most one batch is in flight at a time; the
/// scheduler enforces this with the portfolio's exclusion token. Each
/// signal gets exactly one submission attempt per invocation.
pub struct ExecutionCoordinator {
    gateway: Arc<dyn ExchangeGateway>,
    market_data: Arc<dyn MarketData>,
    ledger: Arc<PositionLedger>,
    signals: Arc<dyn SignalStore>,
    notifier: Arc<dyn Notifier>,
    /// Notional value of each opening order
    order_notional: Decimal,
    /// Bound on every gateway and market-data call
    call_timeout: Duration,
}

impl ExecutionCoordinator {
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        market_data: Arc<dyn MarketData>,
        ledger: Arc<PositionLedger>,
        signals: Arc<dyn SignalStore>,
        notifier: Arc<dyn Notifier>,
        order_notional: Decimal,
        call_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            market_data,
            ledger,
            signals,
            notifier,
            order_notional,
            call_timeout,
        }
    }

    /// Execute a batch of signals in input order.
    ///
    /// The caller supplies the latest risk status; if the circuit breaker is
    /// active the whole batch is rejected and nothing executes, dry run or
    /// not. Individual submission failures are isolated: the failed signal
    /// stays pending and the batch continues.
    ///
    /// A dry run walks the identical path but skips order submission, ledger
    /// mutation, and the signal's executed transition, so a later real run
    /// can still execute the same signals.
    pub async fn execute_signals(
        &self,
        portfolio_id: &str,
        signals: Vec<TradingSignal>,
        risk: &RiskStatus,
        dry_run: bool,
    ) -> Result<ExecutionResult, ExecutionError> {
        if risk.is_halted() {
            info!(
                portfolio_id,
                reason = risk.reason(),
                "execution rejected, circuit breaker active"
            );
            return Err(ExecutionError::CircuitBreakerActive {
                portfolio_id: portfolio_id.to_string(),
                reason: risk.reason().to_string(),
            });
        }

        let mut result = ExecutionResult {
            examined: signals.len(),
            dry_run,
            ..Default::default()
        };

        for signal in &signals {
            match self.execute_one(portfolio_id, signal, dry_run).await {
                Ok(()) => result.executed += 1,
                Err(error) => {
                    warn!(
                        portfolio_id,
                        signal_id = %signal.id,
                        symbol = %signal.symbol,
                        %error,
                        "signal execution failed"
                    );
                    self.notifier.notify(PipelineEvent::ExecutionFailed {
                        portfolio_id: portfolio_id.to_string(),
                        signal_id: signal.id,
                        error: error.to_string(),
                    });
                    result.failed += 1;
                    result.errors.push(SignalFailure {
                        signal_id: signal.id,
                        symbol: signal.symbol.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        info!(
            portfolio_id,
            examined = result.examined,
            executed = result.executed,
            failed = result.failed,
            dry_run,
            "execution batch completed"
        );
        self.notifier.notify(PipelineEvent::BatchCompleted {
            portfolio_id: portfolio_id.to_string(),
            executed: result.executed,
            failed: result.failed,
            dry_run,
        });

        Ok(result)
    }

    /// Refresh ledger prices for every open position in the portfolio.
    ///
    /// Runs under the same exclusion token as execution, keeping the
    /// coordinator the ledger's only writer. Symbols whose quote fetch fails
    /// keep their previous price until the next tick.
    pub async fn refresh_prices(&self, portfolio_id: &str) {
        for symbol in self.ledger.open_symbols(portfolio_id) {
            match timeout(self.call_timeout, self.market_data.get_quote(&symbol)).await {
                Ok(Ok(quote)) => {
                    self.ledger
                        .update_price(portfolio_id, &symbol, quote.price, Utc::now());
                }
                Ok(Err(error)) => {
                    warn!(portfolio_id, %symbol, %error, "price refresh failed");
                }
                Err(_) => {
                    warn!(portfolio_id, %symbol, "price refresh timed out");
                }
            }
        }
    }

    /// Attempt a single signal. Any returned error is recorded against the
    /// signal; it never aborts the batch.
    async fn execute_one(
        &self,
        portfolio_id: &str,
        signal: &TradingSignal,
        dry_run: bool,
    ) -> Result<(), GatewayError> {
        if signal.executed {
            return Err(GatewayError::OrderRejected(
                "signal already executed".to_string(),
            ));
        }

        let fill = match signal.signal_type {
            SignalType::Buy => {
                if signal.price <= Decimal::ZERO {
                    return Err(GatewayError::OrderRejected(format!(
                        "signal price {} is not positive",
                        signal.price
                    )));
                }
                let quantity = (self.order_notional / signal.price).round_dp(8);
                if quantity <= Decimal::ZERO {
                    return Err(GatewayError::OrderRejected(
                        "order notional too small for symbol price".to_string(),
                    ));
                }

                if dry_run {
                    return Ok(());
                }

                let request =
                    OrderRequest::market(portfolio_id, &signal.symbol, signal.signal_type.order_side(), quantity);
                self.submit_bounded(self.gateway.submit_order(&request)).await?
            }
            SignalType::Sell => {
                let Some(position) = self.ledger.position(portfolio_id, &signal.symbol) else {
                    return Err(GatewayError::PositionNotFound(signal.symbol.clone()));
                };

                if dry_run {
                    return Ok(());
                }

                self.submit_bounded(self.gateway.close_position(&position)).await?
            }
        };

        self.record_fill(portfolio_id, signal, &fill).await
    }

    async fn submit_bounded(
        &self,
        call: impl std::future::Future<Output = Result<FillReport, GatewayError>>,
    ) -> Result<FillReport, GatewayError> {
        timeout(self.call_timeout, call)
            .await
            .map_err(|_| GatewayError::Timeout)?
    }

    /// Persist a fill: mark the signal executed, apply the fill to the
    /// ledger, and backfill realized P&L onto the signals involved.
    async fn record_fill(
        &self,
        portfolio_id: &str,
        signal: &TradingSignal,
        fill: &FillReport,
    ) -> Result<(), GatewayError> {
        // Failures past this point are integrity problems, not exchange
        // problems; they still surface as this signal's error.
        self.signals
            .mark_executed(signal.id, fill)
            .await
            .map_err(|e| GatewayError::OrderRejected(e.to_string()))?;

        let outcome = self
            .ledger
            .apply_fill(portfolio_id, fill, Some(signal.id), self.gateway.name())
            .map_err(|e| GatewayError::OrderRejected(e.to_string()))?;

        if outcome.realized_pnl != Decimal::ZERO {
            self.signals
                .backfill_profit_loss(signal.id, outcome.realized_pnl)
                .await
                .map_err(|e| GatewayError::OrderRejected(e.to_string()))?;
        }

        if let Some(trade) = outcome.closed_trade {
            if let Some(opening_signal) = trade.signal_id.filter(|id| *id != signal.id) {
                self.signals
                    .backfill_profit_loss(opening_signal, trade.realized_pnl)
                    .await
                    .map_err(|e| GatewayError::OrderRejected(e.to_string()))?;
            }
        }

        Ok(())
    }
}
