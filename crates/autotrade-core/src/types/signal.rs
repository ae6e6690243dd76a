//! Trading signals and their execution lifecycle.
//!
//! A signal is a strategy-generated proposal to buy or sell an instrument.
//! It is created `pending`, transitions to `executed` exactly once when the
//! execution coordinator fills it, and is immutable afterwards except for a
//! late `profit_loss` backfill when the position it opened is closed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FillReport, Side};
use crate::error::SignalError;

/// Proposed trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Buy,
    Sell,
}

impl SignalType {
    /// Map to the order side used for submission.
    pub fn order_side(&self) -> Side {
        match self {
            SignalType::Buy => Side::Buy,
            SignalType::Sell => Side::Sell,
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalType::Buy => write!(f, "BUY"),
            SignalType::Sell => write!(f, "SELL"),
        }
    }
}

/// Confidence classification of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
}

/// Who triggered the generation that produced this signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Emitted by a scheduled automation tick
    Automated,
    /// Emitted by an operator-triggered ad hoc generation
    Manual,
}

/// Strategy output before it is persisted as a signal.
#[derive(Debug, Clone)]
pub struct SignalDraft {
    pub symbol: String,
    pub signal_type: SignalType,
    pub strength: SignalStrength,
    pub price: Decimal,
}

/// Dedupe key for signal emission: one signal per portfolio per
/// (strategy, symbol, timestamp-bucket).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalKey {
    pub portfolio_id: String,
    pub strategy_id: String,
    pub symbol: String,
    pub bucket: i64,
}

/// Fill details recorded when a signal is executed.
///
/// `profit_loss` stays `None` until the position that resulted from this
/// signal is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionDetails {
    pub filled_price: Decimal,
    pub quantity: Decimal,
    pub profit_loss: Option<Decimal>,
}

/// A proposed trade action, scoped to exactly one portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingSignal {
    pub id: Uuid,
    pub portfolio_id: String,
    pub strategy_id: String,
    pub symbol: String,
    pub signal_type: SignalType,
    pub source: SignalSource,
    pub strength: SignalStrength,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
    pub executed: bool,
    pub execution_timestamp: Option<DateTime<Utc>>,
    pub execution_details: Option<ExecutionDetails>,
}

impl TradingSignal {
    /// Create a new pending signal from a strategy draft.
    pub fn pending(
        portfolio_id: impl Into<String>,
        strategy_id: impl Into<String>,
        source: SignalSource,
        draft: SignalDraft,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_id: portfolio_id.into(),
            strategy_id: strategy_id.into(),
            symbol: draft.symbol,
            signal_type: draft.signal_type,
            source,
            strength: draft.strength,
            price: draft.price,
            timestamp,
            executed: false,
            execution_timestamp: None,
            execution_details: None,
        }
    }

    /// Dedupe key for this signal given the bucket width in seconds.
    pub fn dedupe_key(&self, bucket_secs: i64) -> SignalKey {
        SignalKey {
            portfolio_id: self.portfolio_id.clone(),
            strategy_id: self.strategy_id.clone(),
            symbol: self.symbol.clone(),
            bucket: self.timestamp.timestamp().div_euclid(bucket_secs),
        }
    }

    /// Transition to executed. A signal may only transition once.
    pub fn mark_executed(&mut self, fill: &FillReport) -> Result<(), SignalError> {
        if self.executed {
            return Err(SignalError::AlreadyExecuted(self.id));
        }
        self.executed = true;
        self.execution_timestamp = Some(fill.timestamp);
        self.execution_details = Some(ExecutionDetails {
            filled_price: fill.price,
            quantity: fill.quantity,
            profit_loss: None,
        });
        Ok(())
    }

    /// Realized P&L for this signal, if the resulting position has closed.
    pub fn resolved_profit_loss(&self) -> Option<Decimal> {
        self.execution_details
            .as_ref()
            .and_then(|d| d.profit_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn draft() -> SignalDraft {
        SignalDraft {
            symbol: "BTC-USD".to_string(),
            signal_type: SignalType::Buy,
            strength: SignalStrength::Moderate,
            price: dec!(50000),
        }
    }

    fn fill(signal: &TradingSignal) -> FillReport {
        FillReport {
            order_id: Uuid::new_v4(),
            symbol: signal.symbol.clone(),
            side: signal.signal_type.order_side(),
            quantity: dec!(0.1),
            price: dec!(50010),
            commission: Decimal::ZERO,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_pending_signal() {
        let signal = TradingSignal::pending("p1", "momentum", SignalSource::Automated, draft(), Utc::now());
        assert!(!signal.executed);
        assert!(signal.execution_timestamp.is_none());
        assert!(signal.execution_details.is_none());
    }

    #[test]
    fn test_mark_executed_sets_timestamp() {
        let mut signal =
            TradingSignal::pending("p1", "momentum", SignalSource::Automated, draft(), Utc::now());
        let report = fill(&signal);
        signal.mark_executed(&report).unwrap();

        assert!(signal.executed);
        assert!(signal.execution_timestamp.is_some());
        assert_eq!(
            signal.execution_details.as_ref().unwrap().filled_price,
            dec!(50010)
        );
    }

    #[test]
    fn test_mark_executed_only_once() {
        let mut signal =
            TradingSignal::pending("p1", "momentum", SignalSource::Automated, draft(), Utc::now());
        let report = fill(&signal);
        signal.mark_executed(&report).unwrap();

        let err = signal.mark_executed(&report).unwrap_err();
        assert!(matches!(err, SignalError::AlreadyExecuted(_)));
        assert!(signal.executed);
    }

    #[test]
    fn test_dedupe_key_buckets() {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 10).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 50).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 1, 10).unwrap();

        let a = TradingSignal::pending("p1", "momentum", SignalSource::Automated, draft(), t0);
        let b = TradingSignal::pending("p1", "momentum", SignalSource::Automated, draft(), t1);
        let c = TradingSignal::pending("p1", "momentum", SignalSource::Automated, draft(), t2);

        // 60-second buckets: same minute collides, next minute does not
        assert_eq!(a.dedupe_key(60), b.dedupe_key(60));
        assert_ne!(a.dedupe_key(60), c.dedupe_key(60));
    }
}
