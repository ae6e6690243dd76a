//! Core types and traits for the automated trading pipeline.
//!
//! This crate provides the foundational building blocks including:
//! - Trading signals and their execution lifecycle
//! - Position and trade-history types
//! - Risk circuit-breaker status
//! - Derived performance metrics
//! - Traits for strategies, market data, exchange gateways, stores, and
//!   notification sinks

pub mod types;
pub mod traits;
pub mod error;

pub use error::{PipelineError, PipelineResult};
pub use types::*;
pub use traits::*;
