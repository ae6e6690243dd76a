//! Core data types for the trading pipeline.

mod metrics;
mod order;
mod position;
mod risk;
mod signal;

pub use metrics::{PerformanceMetrics, ProfitFactor, TimeWindow};
pub use order::{FillReport, OrderRequest, Side};
pub use position::{Position, PositionSide, TradeRecord};
pub use risk::RiskStatus;
pub use signal::{
    ExecutionDetails, SignalDraft, SignalKey, SignalSource, SignalStrength, SignalType,
    TradingSignal,
};
