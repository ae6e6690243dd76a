//! In-memory quote source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

use autotrade_core::error::DataError;
use autotrade_core::traits::{MarketData, Quote};

/// Quote source backed by a seeded in-memory series per symbol.
///
/// Used by tests and simulations: quotes are appended explicitly, and
/// `get_quote` always serves the latest one.
pub struct StaticQuotes {
    quotes: RwLock<HashMap<String, Vec<Quote>>>,
}

impl StaticQuotes {
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
        }
    }

    /// Append a quote for a symbol.
    pub fn push(&self, symbol: &str, price: Decimal, timestamp: DateTime<Utc>) {
        let mut quotes = self.quotes.write().unwrap();
        quotes.entry(symbol.to_string()).or_default().push(Quote {
            symbol: symbol.to_string(),
            price,
            timestamp,
        });
    }

    /// Append a quote stamped now.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.push(symbol, price, Utc::now());
    }
}

impl Default for StaticQuotes {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketData for StaticQuotes {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let quotes = self.quotes.read().unwrap();
        quotes
            .get(symbol)
            .and_then(|series| series.last())
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
    }

    async fn get_quote_history(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Quote>, DataError> {
        let quotes = self.quotes.read().unwrap();
        let series = quotes
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;
        let start = series.len().saturating_sub(limit);
        Ok(series[start..].to_vec())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_latest_quote() {
        let source = StaticQuotes::new();
        source.set_price("BTC-USD", dec!(50000));
        source.set_price("BTC-USD", dec!(50500));

        let quote = source.get_quote("BTC-USD").await.unwrap();
        assert_eq!(quote.price, dec!(50500));
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let source = StaticQuotes::new();
        let err = source.get_quote("GHOST").await.unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
    }

    #[tokio::test]
    async fn test_history_is_bounded_and_ordered() {
        let source = StaticQuotes::new();
        for i in 0..5 {
            source.set_price("ETH-USD", Decimal::from(3000 + i));
        }

        let history = source.get_quote_history("ETH-USD", 3).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].price, dec!(3002));
        assert_eq!(history[2].price, dec!(3004));
    }
}
