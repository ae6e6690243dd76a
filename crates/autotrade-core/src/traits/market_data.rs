//! Market data provider trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// A point-in-time price observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Trait for market data providers.
///
/// Implementations are external collaborators; the pipeline never retries
/// failed fetches inline, it surfaces the error and lets the next tick retry.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Get the latest quote for a symbol.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError>;

    /// Get recent quotes for a symbol, ordered oldest to newest.
    ///
    /// Returns at most `limit` quotes, ending with the latest.
    async fn get_quote_history(&self, symbol: &str, limit: usize)
        -> Result<Vec<Quote>, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
