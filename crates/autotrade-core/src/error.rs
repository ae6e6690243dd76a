//! Error types for the trading pipeline.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::types::PositionSide;

/// Top-level pipeline error.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Risk error: {0}")]
    Risk(#[from] RiskError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Signal generation and signal store errors.
#[derive(Error, Debug)]
pub enum SignalError {
    /// Market data could not be fetched. Propagated to the caller; the
    /// scheduler retries on the next tick, never inline.
    #[error("Market data unavailable: {0}")]
    MarketDataUnavailable(String),

    #[error("Unknown portfolio: {0}")]
    UnknownPortfolio(String),

    #[error("Signal not found: {0}")]
    NotFound(Uuid),

    /// A signal may transition to executed exactly once.
    #[error("Signal {0} is already executed")]
    AlreadyExecuted(Uuid),

    #[error("Signal store error: {0}")]
    Store(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// Risk evaluation errors.
#[derive(Error, Debug)]
pub enum RiskError {
    /// Risk inputs could not be fetched. The breaker fails safe: an existing
    /// halt is not cleared, and no new halt is tripped from this alone.
    #[error("Risk data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Unknown portfolio: {0}")]
    UnknownPortfolio(String),
}

/// Execution coordinator errors.
///
/// Per-signal submission failures are not represented here; they are
/// collected in `ExecutionResult::errors` so one failed signal never aborts
/// the rest of the batch.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Circuit breaker active for portfolio {portfolio_id}: {reason}")]
    CircuitBreakerActive {
        portfolio_id: String,
        reason: String,
    },

    #[error("Unknown portfolio: {0}")]
    UnknownPortfolio(String),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Exchange gateway errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway call timed out")]
    Timeout,
}

/// Market data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

/// Position ledger errors. Integrity violations are fatal to the offending
/// call and never silently coerced.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Position quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("Position side {side:?} inconsistent with quantity {quantity}")]
    QuantitySideMismatch {
        side: PositionSide,
        quantity: Decimal,
    },

    #[error("No open position in {symbol} for portfolio {portfolio_id}")]
    PositionNotFound {
        portfolio_id: String,
        symbol: String,
    },

    #[error("Unknown portfolio: {0}")]
    UnknownPortfolio(String),
}

/// Strategy construction and configuration errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
