//! Strategy registry for configuration-driven strategy construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use autotrade_core::{error::StrategyError, traits::Strategy, traits::StrategyConfig};

use crate::{MeanReversionConfig, MeanReversionStrategy, MomentumConfig, MomentumStrategy};

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry of available strategies.
pub struct StrategyRegistry {
    strategies: HashMap<String, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new registry with all built-in strategies.
    pub fn new() -> Self {
        let mut strategies = HashMap::new();

        strategies.insert(
            "momentum".to_string(),
            StrategyInfo {
                name: "Momentum".to_string(),
                description: "Follows price momentum over a lookback window".to_string(),
                default_config: serde_json::to_value(MomentumConfig::default()).unwrap(),
            },
        );

        strategies.insert(
            "mean_reversion".to_string(),
            StrategyInfo {
                name: "Mean Reversion".to_string(),
                description: "Trades reversions to a rolling average".to_string(),
                default_config: serde_json::to_value(MeanReversionConfig::default()).unwrap(),
            },
        );

        Self { strategies }
    }

    /// List all available strategies.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Create a strategy instance from configuration.
    ///
    /// Missing parameters fall back to the strategy's defaults; `symbols`
    /// always comes from the portfolio binding.
    pub fn create(
        &self,
        name: &str,
        params: serde_json::Value,
        symbols: Vec<String>,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        // A binding with no params means "use the defaults"
        let params = if params.is_null() {
            self.get(name)
                .map(|info| info.default_config.clone())
                .unwrap_or(params)
        } else {
            params
        };

        match name {
            "momentum" => {
                let mut config: MomentumConfig = serde_json::from_value(params)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.symbols = symbols;
                config.validate()?;
                Ok(Box::new(MomentumStrategy::new(config)))
            }
            "mean_reversion" => {
                let mut config: MeanReversionConfig = serde_json::from_value(params)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.symbols = symbols;
                config.validate()?;
                Ok(Box::new(MeanReversionStrategy::new(config)))
            }
            _ => Err(StrategyError::NotFound(name.to_string())),
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(
        &self,
        name: &str,
        symbols: Vec<String>,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let info = self
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        self.create(name, info.default_config.clone(), symbols)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
