//! CSV quote source.
//!
//! Loads a quote history from a CSV file for offline simulation. Expected
//! columns: timestamp, symbol, price (header names are matched loosely).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use autotrade_core::error::DataError;
use autotrade_core::traits::{MarketData, Quote};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    timestamp: String,
    #[serde(alias = "Symbol", alias = "symbol", alias = "ticker")]
    symbol: String,
    #[serde(alias = "Price", alias = "price", alias = "close", alias = "Close")]
    price: Decimal,
}

/// Quote source replaying a CSV file.
#[derive(Debug)]
pub struct CsvReplaySource {
    quotes: HashMap<String, Vec<Quote>>,
}

impl CsvReplaySource {
    /// Load all quotes from a CSV file, sorted per symbol by timestamp.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut quotes: HashMap<String, Vec<Quote>> = HashMap::new();

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let timestamp = parse_timestamp(&record.timestamp)?;

            quotes.entry(record.symbol.clone()).or_default().push(Quote {
                symbol: record.symbol,
                price: record.price,
                timestamp,
            });
        }

        for series in quotes.values_mut() {
            series.sort_by_key(|q| q.timestamp);
        }

        Ok(Self { quotes })
    }

    /// Symbols present in the file.
    pub fn symbols(&self) -> Vec<&String> {
        self.quotes.keys().collect()
    }
}

/// Parse various timestamp formats.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DataError> {
    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let dt = d.and_hms_opt(0, 0, 0).unwrap();
        return Ok(dt.and_utc());
    }

    // Unix timestamp; assume milliseconds when the magnitude says so
    if let Ok(ts) = value.parse::<i64>() {
        let dt = if ts > 10_000_000_000 {
            DateTime::from_timestamp_millis(ts)
        } else {
            DateTime::from_timestamp(ts, 0)
        };
        return dt.ok_or_else(|| DataError::ParseError(format!("timestamp out of range: {ts}")));
    }

    Err(DataError::ParseError(format!(
        "could not parse timestamp: {value}"
    )))
}

#[async_trait]
impl MarketData for CsvReplaySource {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        self.quotes
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
        let series = self
            .quotes
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;
        let start = series.len().saturating_sub(limit);
        Ok(series[start..].to_vec())
    }

    fn name(&self) -> &str {
        "csv-replay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("1705312800000").is_ok()); // Unix ms
        assert!(parse_timestamp("1705312800").is_ok()); // Unix sec
        assert!(parse_timestamp("not-a-date").is_err());
    }

    #[tokio::test]
    async fn test_load_and_query() {
        let mut file = tempfile_with(
            "timestamp,symbol,price\n\
             2024-01-15 10:00:00,BTC-USD,50000\n\
             2024-01-15 10:01:00,BTC-USD,50100\n\
             2024-01-15 10:00:00,ETH-USD,3000\n",
        );
        file.flush().unwrap();

        let source = CsvReplaySource::load(file.path()).unwrap();
        assert_eq!(source.symbols().len(), 2);

        let quote = source.get_quote("BTC-USD").await.unwrap();
        assert_eq!(quote.price, dec!(50100));

        let history = source.get_quote_history("BTC-USD", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp < history[1].timestamp);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = CsvReplaySource::load(Path::new("/nonexistent/quotes.csv")).unwrap_err();
        assert!(matches!(err, DataError::NoDataAvailable));
    }

    fn tempfile_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }
}
