//! Per-portfolio risk gate state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Circuit-breaker status for one portfolio.
///
/// While `circuit_breaker_active` is true the execution coordinator rejects
/// all new executions for the portfolio regardless of signal content. The
/// halt clears only through an explicit reset evaluation, never by elapsed
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskStatus {
    pub portfolio_id: String,
    pub circuit_breaker_active: bool,
    /// Required whenever the breaker is active
    pub circuit_breaker_reason: Option<String>,
    /// When the breaker opened
    pub tripped_at: Option<DateTime<Utc>>,
    pub last_evaluated_at: DateTime<Utc>,
}

impl RiskStatus {
    /// Status allowing trading.
    pub fn allow(portfolio_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            circuit_breaker_active: false,
            circuit_breaker_reason: None,
            tripped_at: None,
            last_evaluated_at: now,
        }
    }

    /// Status halting trading. A reason is mandatory.
    pub fn halt(
        portfolio_id: impl Into<String>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            circuit_breaker_active: true,
            circuit_breaker_reason: Some(reason.into()),
            tripped_at: Some(now),
            last_evaluated_at: now,
        }
    }

    /// Check if automated execution is currently blocked.
    pub fn is_halted(&self) -> bool {
        self.circuit_breaker_active
    }

    /// Reason for the halt, or an empty string when trading is allowed.
    pub fn reason(&self) -> &str {
        self.circuit_breaker_reason.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_status() {
        let status = RiskStatus::allow("p1", Utc::now());
        assert!(!status.is_halted());
        assert!(status.circuit_breaker_reason.is_none());
        assert!(status.tripped_at.is_none());
    }

    #[test]
    fn test_halt_carries_reason() {
        let status = RiskStatus::halt("p1", "drawdown 25.00% exceeds limit 20%", Utc::now());
        assert!(status.is_halted());
        assert_eq!(status.reason(), "drawdown 25.00% exceeds limit 20%");
        assert!(status.tripped_at.is_some());
    }
}
