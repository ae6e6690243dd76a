//! Market data providers.
//!
//! The pipeline consumes market data through the `MarketData` trait; this
//! crate ships the in-process implementations used for simulation and
//! testing. Real-time providers are external collaborators.

mod csv_source;
mod static_source;

pub use csv_source::CsvReplaySource;
pub use static_source::StaticQuotes;
