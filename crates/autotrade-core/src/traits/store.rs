//! Portfolio and signal persistence traits.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DataError, SignalError};
use crate::types::{FillReport, SignalKey, TimeWindow, TradingSignal};

/// A strategy attached to a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyBinding {
    /// Registry name of the strategy
    pub strategy: String,
    /// Symbols the strategy evaluates
    pub symbols: Vec<String>,
    /// Strategy-specific parameters, merged over the defaults
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Portfolio configuration as read from the portfolio store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    pub id: String,
    /// Whether the automation scheduler runs this portfolio
    pub automated_trading_enabled: bool,
    /// Equity basis for risk evaluation
    pub initial_capital: Decimal,
    #[serde(default)]
    pub strategies: Vec<StrategyBinding>,
}

/// Trait for the portfolio configuration store.
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Read one portfolio's configuration.
    async fn get_portfolio(&self, id: &str) -> Result<PortfolioConfig, DataError>;

    /// List all configured portfolios.
    async fn list_portfolios(&self) -> Result<Vec<PortfolioConfig>, DataError>;

    /// Persist the automation toggle for a portfolio.
    async fn set_automation_enabled(&self, id: &str, enabled: bool) -> Result<(), DataError>;
}

/// Outcome of recording a signal: either it was inserted, or a pending
/// signal with the same dedupe key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    Duplicate,
}

/// Trait for signal persistence.
///
/// The store is the authority for the executed-exactly-once lifecycle and
/// for dedupe across repeated generation of the same timestamp bucket.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Record a new pending signal unless its dedupe key is already taken.
    async fn record(
        &self,
        signal: TradingSignal,
        key: SignalKey,
    ) -> Result<RecordOutcome, SignalError>;

    /// Mark a pending signal as executed with its fill details.
    async fn mark_executed(&self, id: Uuid, fill: &FillReport) -> Result<(), SignalError>;

    /// Backfill realized P&L onto an executed signal once its position closes.
    async fn backfill_profit_loss(&self, id: Uuid, profit_loss: Decimal)
        -> Result<(), SignalError>;

    /// Pending signals for a portfolio, oldest first.
    async fn pending(&self, portfolio_id: &str) -> Result<Vec<TradingSignal>, SignalError>;

    /// All signals for a portfolio whose generation timestamp falls in the
    /// window, oldest first.
    async fn in_window(
        &self,
        portfolio_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<TradingSignal>, SignalError>;
}
