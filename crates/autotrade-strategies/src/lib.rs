//! Trading strategy implementations.
//!
//! This crate provides the strategies the signal generator can attach to a
//! portfolio:
//! - Momentum (rate-of-change threshold following)
//! - Mean Reversion (deviation from a rolling average)
//!
//! The numeric logic is illustrative; the pipeline hosts and governs
//! strategies, it does not prescribe them.

mod mean_reversion;
mod momentum;
mod registry;

pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use momentum::{MomentumConfig, MomentumStrategy};
pub use registry::{StrategyInfo, StrategyRegistry};
