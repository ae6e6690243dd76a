//! Signal generator.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use autotrade_core::error::{DataError, SignalError};
use autotrade_core::traits::{
    MarketData, PortfolioStore, RecordOutcome, SignalStore, StrategyContext,
};
use autotrade_core::types::{SignalSource, TradingSignal};
use autotrade_ledger::PositionLedger;
use autotrade_strategies::StrategyRegistry;

/// Evaluates the strategies attached to a portfolio and persists new
/// pending signals.
///
/// Generation is idempotent per (portfolio, strategy, symbol,
/// timestamp-bucket): invoking it twice for the same tick emits nothing the
/// second time.
pub struct SignalGenerator {
    portfolios: Arc<dyn PortfolioStore>,
    market_data: Arc<dyn MarketData>,
    store: Arc<dyn SignalStore>,
    ledger: Arc<PositionLedger>,
    registry: StrategyRegistry,
    bucket_secs: i64,
}

impl SignalGenerator {
    pub fn new(
        portfolios: Arc<dyn PortfolioStore>,
        market_data: Arc<dyn MarketData>,
        store: Arc<dyn SignalStore>,
        ledger: Arc<PositionLedger>,
        bucket_secs: i64,
    ) -> Self {
        Self {
            portfolios,
            market_data,
            store,
            ledger,
            registry: StrategyRegistry::new(),
            bucket_secs,
        }
    }

    /// Evaluate every attached strategy as of the given timestamp and return
    /// the newly emitted signals.
    ///
    /// Reads market data and portfolio state only; never touches the
    /// position ledger. A portfolio with no attached strategies yields an
    /// empty batch, not an error.
    pub async fn generate(
        &self,
        portfolio_id: &str,
        as_of: DateTime<Utc>,
        source: SignalSource,
    ) -> Result<Vec<TradingSignal>, SignalError> {
        let portfolio = self
            .portfolios
            .get_portfolio(portfolio_id)
            .await
            .map_err(|e| match e {
                DataError::PortfolioNotFound(id) => SignalError::UnknownPortfolio(id),
                other => SignalError::Store(other.to_string()),
            })?;

        if portfolio.strategies.is_empty() {
            debug!(portfolio_id, "no active strategies, nothing to generate");
            return Ok(Vec::new());
        }

        let mut emitted = Vec::new();

        for binding in &portfolio.strategies {
            let strategy = self.registry.create(
                &binding.strategy,
                binding.params.clone(),
                binding.symbols.clone(),
            )?;

            for symbol in strategy.symbols() {
                let quote = self
                    .market_data
                    .get_quote(symbol)
                    .await
                    .map_err(|e| SignalError::MarketDataUnavailable(e.to_string()))?;
                let history = self
                    .market_data
                    .get_quote_history(symbol, strategy.history_len())
                    .await
                    .map_err(|e| SignalError::MarketDataUnavailable(e.to_string()))?;

                let position = self.ledger.position(portfolio_id, symbol);

                let ctx = StrategyContext {
                    portfolio_id,
                    symbol,
                    quote: &quote,
                    history: &history,
                    position: position.as_ref(),
                    as_of,
                };

                let Some(draft) = strategy.evaluate(&ctx) else {
                    continue;
                };

                let signal = TradingSignal::pending(
                    portfolio_id,
                    strategy.id(),
                    source,
                    draft,
                    as_of,
                );
                let key = signal.dedupe_key(self.bucket_secs);

                match self.store.record(signal.clone(), key).await? {
                    RecordOutcome::Inserted => {
                        info!(
                            portfolio_id,
                            strategy = strategy.id(),
                            symbol = %signal.symbol,
                            signal_type = %signal.signal_type,
                            price = %signal.price,
                            "signal emitted"
                        );
                        emitted.push(signal);
                    }
                    RecordOutcome::Duplicate => {
                        debug!(
                            portfolio_id,
                            strategy = strategy.id(),
                            symbol = %signal.symbol,
                            "duplicate signal for bucket, skipped"
                        );
                    }
                }
            }
        }

        Ok(emitted)
    }
}
