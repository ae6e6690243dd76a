//! Mean reversion strategy.
//!
//! Buys when the price trades far enough below its rolling average and
//! closes the position once the price recovers to the average. Long-only.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use autotrade_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig, StrategyContext},
    types::{SignalDraft, SignalStrength, SignalType},
};

/// Configuration for the Mean Reversion strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionConfig {
    /// Symbols to evaluate
    pub symbols: Vec<String>,
    /// Rolling average window in quotes
    pub lookback: usize,
    /// Percentage below the average that triggers entry
    pub entry_deviation_pct: Decimal,
    /// Deviation above the average that closes the position
    pub exit_deviation_pct: Decimal,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            symbols: vec![],
            lookback: 20,
            entry_deviation_pct: dec!(3),
            exit_deviation_pct: dec!(0.5),
        }
    }
}

impl StrategyConfig for MeanReversionConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.lookback < 2 {
            return Err(StrategyError::InvalidConfig(
                "Lookback must be at least 2".into(),
            ));
        }
        if self.entry_deviation_pct <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "Entry deviation must be positive".into(),
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

/// Mean reversion strategy.
pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
}

impl MeanReversionStrategy {
    /// Create a new Mean Reversion strategy.
    pub fn new(config: MeanReversionConfig) -> Self {
        Self { config }
    }

    /// Deviation of the latest price from the rolling average, in percent.
    fn deviation_pct(&self, ctx: &StrategyContext<'_>) -> Option<Decimal> {
        if ctx.history.len() < self.config.lookback {
            return None;
        }
        let window = &ctx.history[ctx.history.len() - self.config.lookback..];
        let sum: Decimal = window.iter().map(|q| q.price).sum();
        let mean = sum / Decimal::from(window.len() as u64);
        if mean == Decimal::ZERO {
            return None;
        }
        Some((ctx.quote.price - mean) / mean * dec!(100))
    }

    fn classify_strength(&self, deviation_pct: Decimal) -> SignalStrength {
        let magnitude = deviation_pct.abs();
        if magnitude >= self.config.entry_deviation_pct * dec!(2) {
            SignalStrength::Strong
        } else if magnitude >= self.config.entry_deviation_pct * dec!(1.5) {
            SignalStrength::Moderate
        } else {
            SignalStrength::Weak
        }
    }
}

impl Strategy for MeanReversionStrategy {
    fn id(&self) -> &str {
        "mean_reversion"
    }

    fn description(&self) -> &str {
        "Trades reversions to a rolling average"
    }

    fn symbols(&self) -> &[String] {
        &self.config.symbols
    }

    fn history_len(&self) -> usize {
        self.config.lookback
    }

    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Option<SignalDraft> {
        let deviation_pct = self.deviation_pct(ctx)?;
        let holding = ctx.position.map(|p| p.is_long()).unwrap_or(false);

        if !holding && deviation_pct <= -self.config.entry_deviation_pct {
            return Some(SignalDraft {
                symbol: ctx.symbol.to_string(),
                signal_type: SignalType::Buy,
                strength: self.classify_strength(deviation_pct),
                price: ctx.quote.price,
            });
        }

        if holding && deviation_pct >= self.config.exit_deviation_pct {
            return Some(SignalDraft {
                symbol: ctx.symbol.to_string(),
                signal_type: SignalType::Sell,
                strength: self.classify_strength(deviation_pct),
                price: ctx.quote.price,
            });
        }

        None
    }
}
