//! Risk threshold configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Breach thresholds for the circuit breaker.
///
/// The concrete limits are operator policy, so they are configuration
/// rather than code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Drawdown from peak equity that halts trading
    pub max_drawdown_pct: Decimal,
    /// Total exposure as a percentage of equity that halts trading
    pub max_exposure_pct: Decimal,
    /// Largest single position as a percentage of equity that halts trading
    pub max_concentration_pct: Decimal,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            max_drawdown_pct: dec!(20),
            max_exposure_pct: dec!(80),
            max_concentration_pct: dec!(25),
        }
    }
}
