//! Risk circuit breaker.
//!
//! A per-portfolio gate with two states: allow (trading permitted) and halt
//! (all automated execution blocked). Trips on configurable breaches of
//! drawdown, exposure, or position concentration; clears only through an
//! explicit reset evaluation that re-confirms the bounds.

mod breaker;
mod thresholds;

pub use breaker::CircuitBreaker;
pub use thresholds::RiskThresholds;
