//! Performance metrics aggregation.
//!
//! Metrics are a pure function of signal history within a window: they are
//! recomputed from the store on every request, never maintained
//! incrementally, so they always agree with the ledger at the cost of
//! O(window) work.

mod aggregator;

pub use aggregator::{compute_metrics, MetricsAggregator};
