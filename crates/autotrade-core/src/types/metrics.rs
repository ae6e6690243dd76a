//! Derived performance metrics.
//!
//! Metrics are recomputed from persisted signal history on demand, never
//! maintained incrementally, so they are always consistent with the ledger.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ratio of gross profit to gross loss across resolved trades.
///
/// `Infinite` is the explicit representation for "some wins, zero losses";
/// it serializes as JSON `null` and displays as `inf`. The all-zero history
/// case is the finite zero, so the two states are never conflated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfitFactor {
    Finite(Decimal),
    Infinite,
}

impl ProfitFactor {
    /// Compute from gross profit and gross loss (both non-negative).
    pub fn from_sums(gross_profit: Decimal, gross_loss: Decimal) -> Self {
        if gross_loss > Decimal::ZERO {
            ProfitFactor::Finite(gross_profit / gross_loss)
        } else if gross_profit > Decimal::ZERO {
            ProfitFactor::Infinite
        } else {
            ProfitFactor::Finite(Decimal::ZERO)
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, ProfitFactor::Infinite)
    }

    /// Finite value, if any.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ProfitFactor::Finite(value) => Some(*value),
            ProfitFactor::Infinite => None,
        }
    }
}

impl Default for ProfitFactor {
    fn default() -> Self {
        ProfitFactor::Finite(Decimal::ZERO)
    }
}

impl std::fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfitFactor::Finite(value) => write!(f, "{value:.2}"),
            ProfitFactor::Infinite => write!(f, "inf"),
        }
    }
}

/// Rolling performance statistics for one portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Signals generated within the window
    pub total_signals: u64,
    /// Signals executed within the window
    pub executed_signals: u64,
    /// executed / total, as a percentage in [0, 100]
    pub success_rate: Decimal,
    /// Winning share of executed signals with a resolved P&L, in [0, 100]
    pub win_rate: Decimal,
    pub profit_factor: ProfitFactor,
    /// Net realized P&L across resolved signals
    pub net_pnl: Decimal,
    /// Distinct strategies that emitted signals in the window
    pub active_strategies_count: u64,
}

/// Half-open time range used for metrics windows and history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Window ending at `end` and reaching `duration` into the past.
    pub fn trailing(end: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            from: end - duration,
            to: end,
        }
    }

    /// Check whether a timestamp falls inside the window.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.from && timestamp <= self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profit_factor_finite() {
        let pf = ProfitFactor::from_sums(dec!(1200), dec!(100));
        assert_eq!(pf, ProfitFactor::Finite(dec!(12)));
        assert!(!pf.is_infinite());
    }

    #[test]
    fn test_profit_factor_infinite_when_no_losses() {
        let pf = ProfitFactor::from_sums(dec!(500), Decimal::ZERO);
        assert!(pf.is_infinite());
        assert_eq!(pf.as_decimal(), None);
        assert_eq!(pf.to_string(), "inf");
    }

    #[test]
    fn test_profit_factor_zero_when_empty() {
        let pf = ProfitFactor::from_sums(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(pf, ProfitFactor::Finite(Decimal::ZERO));
    }

    #[test]
    fn test_profit_factor_serializes_infinite_as_null() {
        let json = serde_json::to_string(&ProfitFactor::Infinite).unwrap();
        assert_eq!(json, "null");

        let json = serde_json::to_string(&ProfitFactor::Finite(dec!(2.5))).unwrap();
        assert_eq!(json, "\"2.5\"");
    }

    #[test]
    fn test_time_window_trailing() {
        let end = Utc::now();
        let window = TimeWindow::trailing(end, Duration::hours(24));

        assert!(window.contains(end));
        assert!(window.contains(end - Duration::hours(23)));
        assert!(!window.contains(end - Duration::hours(25)));
        assert!(!window.contains(end + Duration::seconds(1)));
    }

    #[test]
    fn test_default_metrics_are_zero() {
        let metrics = PerformanceMetrics::default();
        assert_eq!(metrics.total_signals, 0);
        assert_eq!(metrics.success_rate, Decimal::ZERO);
        assert_eq!(metrics.profit_factor, ProfitFactor::Finite(Decimal::ZERO));
    }
}
