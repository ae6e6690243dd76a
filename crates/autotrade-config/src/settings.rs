//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use autotrade_core::traits::PortfolioConfig;
use autotrade_risk::RiskThresholds;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub risk: RiskThresholds,
    #[serde(default)]
    pub market_data: MarketDataSettings,
    #[serde(default)]
    pub portfolios: Vec<PortfolioConfig>,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "autotrade".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Scheduler timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Seconds between automation ticks
    pub tick_interval_secs: u64,
    /// Width of the signal dedupe bucket in seconds
    pub signal_bucket_secs: i64,
    /// Bound on every market-data and exchange call
    pub call_timeout_secs: u64,
    /// Trailing metrics window in hours
    pub metrics_window_hours: i64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: 60,
            signal_bucket_secs: 60,
            call_timeout_secs: 10,
            metrics_window_hours: 24,
        }
    }
}

/// Execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Notional value of each opening order
    pub order_notional: Decimal,
    /// Paper gateway slippage percentage
    pub slippage_pct: Decimal,
    /// Paper gateway commission per unit
    pub commission_per_unit: Decimal,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            order_notional: dec!(1000),
            slippage_pct: dec!(0.05),
            commission_per_unit: Decimal::ZERO,
        }
    }
}

/// Market data provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarketDataSource {
    /// In-memory quotes, seeded at runtime
    #[default]
    Static,
    /// Replay of a CSV quote file
    Csv,
}

/// Market data settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MarketDataSettings {
    #[serde(default)]
    pub source: MarketDataSource,
    /// Quote file for the csv source
    pub csv_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.app.name, "autotrade");
        assert_eq!(config.scheduler.tick_interval_secs, 60);
        assert_eq!(config.execution.order_notional, dec!(1000));
        assert_eq!(config.market_data.source, MarketDataSource::Static);
        assert!(config.portfolios.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let raw = r#"
            [app]
            name = "autotrade"
            environment = "test"

            [scheduler]
            tick_interval_secs = 30
            signal_bucket_secs = 30
            call_timeout_secs = 5
            metrics_window_hours = 12

            [risk]
            max_drawdown_pct = "15"

            [[portfolios]]
            id = "main"
            automated_trading_enabled = true
            initial_capital = "50000"

            [[portfolios.strategies]]
            strategy = "momentum"
            symbols = ["BTC-USD"]
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.scheduler.tick_interval_secs, 30);
        assert_eq!(config.risk.max_drawdown_pct, dec!(15));
        assert_eq!(config.portfolios.len(), 1);
        assert_eq!(config.portfolios[0].strategies[0].strategy, "momentum");
        // Omitted params default to null and fall back to strategy defaults
        assert!(config.portfolios[0].strategies[0].params.is_null());
    }
}
