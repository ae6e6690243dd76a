//! Momentum strategy.
//!
//! Buys when the rate of change over the lookback window exceeds the entry
//! threshold, and closes the position when momentum decays below the exit
//! threshold. Long-only.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use autotrade_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig, StrategyContext},
    types::{SignalDraft, SignalStrength, SignalType},
};

/// Configuration for the Momentum strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Symbols to evaluate
    pub symbols: Vec<String>,
    /// Rate-of-change lookback in quotes
    pub lookback: usize,
    /// Minimum percentage change for entry
    pub entry_threshold_pct: Decimal,
    /// Percentage decline that closes the position
    pub exit_threshold_pct: Decimal,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            symbols: vec![],
            lookback: 12,
            entry_threshold_pct: dec!(2),
            exit_threshold_pct: dec!(1),
        }
    }
}

impl StrategyConfig for MomentumConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback == 0 {
            return Err(StrategyError::InvalidConfig(
                "Lookback must be greater than 0".into(),
            ));
        }
        if self.entry_threshold_pct <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "Entry threshold must be positive".into(),
            ));
        }
        if self.exit_threshold_pct < Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "Exit threshold must not be negative".into(),
            ));
        }
        if self.symbols.is_empty() {
            return Err(StrategyError::InvalidConfig(
                "At least one symbol required".into(),
            ));
        }
        Ok(())
    }
}

/// Momentum strategy.
pub struct MomentumStrategy {
    config: MomentumConfig,
}

impl MomentumStrategy {
    /// Create a new Momentum strategy.
    pub fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    fn classify_strength(&self, change_pct: Decimal) -> SignalStrength {
        let magnitude = change_pct.abs();
        if magnitude >= self.config.entry_threshold_pct * dec!(2) {
            SignalStrength::Strong
        } else if magnitude >= self.config.entry_threshold_pct * dec!(1.5) {
            SignalStrength::Moderate
        } else {
            SignalStrength::Weak
        }
    }

    /// Percentage change from the start of the lookback window.
    fn rate_of_change(&self, ctx: &StrategyContext<'_>) -> Option<Decimal> {
        if ctx.history.len() < self.config.lookback + 1 {
            return None;
        }
        let base = &ctx.history[ctx.history.len() - 1 - self.config.lookback];
        if base.price == Decimal::ZERO {
            return None;
        }
        Some((ctx.quote.price - base.price) / base.price * dec!(100))
    }
}

impl Strategy for MomentumStrategy {
    fn id(&self) -> &str {
        "momentum"
    }

    fn description(&self) -> &str {
        "Follows price momentum over a lookback window"
    }

    fn symbols(&self) -> &[String] {
        &self.config.symbols
    }

    fn history_len(&self) -> usize {
        self.config.lookback + 1
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Option<SignalDraft> {
        let change_pct = self.rate_of_change(ctx)?;
        let holding = ctx.position.map(|p| p.is_long()).unwrap_or(false);

        if !holding && change_pct >= self.config.entry_threshold_pct {
            return Some(SignalDraft {
                symbol: ctx.symbol.to_string(),
                signal_type: SignalType::Buy,
                strength: self.classify_strength(change_pct),
                price: ctx.quote.price,
            });
        }

        if holding && change_pct <= -self.config.exit_threshold_pct {
            return Some(SignalDraft {
                symbol: ctx.symbol.to_string(),
                signal_type: SignalType::Sell,
                strength: self.classify_strength(change_pct),
                price: ctx.quote.price,
            });
        }

        None
    }
}
