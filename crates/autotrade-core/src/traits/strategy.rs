//! Strategy trait definitions.

use chrono::{DateTime, Utc};

use crate::error::StrategyError;
use crate::types::{Position, SignalDraft};

use super::Quote;

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Everything a strategy may inspect when evaluating one symbol.
///
/// Strategies read market and portfolio state; they never mutate the ledger.
pub struct StrategyContext<'a> {
    pub portfolio_id: &'a str,
    pub symbol: &'a str,
    /// Latest quote for the symbol
    pub quote: &'a Quote,
    /// Recent quotes, oldest to newest, ending with `quote`
    pub history: &'a [Quote],
    /// Open position in the symbol, if any
    pub position: Option<&'a Position>,
    /// Evaluation timestamp, for deterministic replay
    pub as_of: DateTime<Utc>,
}

/// Core strategy trait.
///
/// The signal generator calls `evaluate` once per attached symbol per tick.
/// Evaluation is pure: the same context always yields the same draft, which
/// keeps generation replayable and the dedupe key meaningful.
pub trait Strategy: Send + Sync {
    /// Stable identifier used for dedupe keys and metrics.
    fn id(&self) -> &str;

    /// Get the symbols this strategy evaluates.
    fn symbols(&self) -> &[String];

    /// Number of historical quotes the strategy needs to evaluate.
    fn history_len(&self) -> usize;

    /// Evaluate one symbol and optionally propose a trade.
    fn evaluate(&self, ctx: &StrategyContext<'_>) -> Option<SignalDraft>;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SignalStrength, SignalType};
    use rust_decimal_macros::dec;

    struct AlwaysBuy {
        symbols: Vec<String>,
    }

    impl Strategy for AlwaysBuy {
        fn id(&self) -> &str {
            "always_buy"
        }

        fn symbols(&self) -> &[String] {
            &self.symbols
        }

        fn history_len(&self) -> usize {
            1
        }

        fn evaluate(&self, ctx: &StrategyContext<'_>) -> Option<SignalDraft> {
            Some(SignalDraft {
                symbol: ctx.symbol.to_string(),
                signal_type: SignalType::Buy,
                strength: SignalStrength::Weak,
                price: ctx.quote.price,
            })
        }
    }

    #[test]
    fn test_strategy_evaluation() {
        let strategy = AlwaysBuy {
            symbols: vec!["BTC-USD".to_string()],
        };
        let quote = Quote {
            symbol: "BTC-USD".to_string(),
            price: dec!(50000),
            timestamp: Utc::now(),
        };
        let history = vec![quote.clone()];

        let ctx = StrategyContext {
            portfolio_id: "p1",
            symbol: "BTC-USD",
            quote: &quote,
            history: &history,
            position: None,
            as_of: Utc::now(),
        };

        let draft = strategy.evaluate(&ctx).unwrap();
        assert_eq!(draft.signal_type, SignalType::Buy);
        assert_eq!(draft.price, dec!(50000));
    }
}
