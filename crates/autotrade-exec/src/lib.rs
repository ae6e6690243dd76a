//! Execution coordinator.
//!
//! Consumes pending signals, gates on the circuit-breaker status, submits
//! orders through the exchange gateway, and applies fills to the position
//! ledger. The coordinator is the sole writer of signal execution state and
//! of realized P&L on positions.

mod coordinator;

pub use coordinator::{ExecutionCoordinator, ExecutionResult, SignalFailure};
