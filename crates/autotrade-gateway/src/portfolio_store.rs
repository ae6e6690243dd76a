//! In-memory portfolio store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use autotrade_core::error::DataError;
use autotrade_core::traits::{PortfolioConfig, PortfolioStore};

/// Portfolio store backed by configuration loaded at startup.
pub struct MemoryPortfolioStore {
    portfolios: RwLock<HashMap<String, PortfolioConfig>>,
}

impl MemoryPortfolioStore {
    pub fn new(portfolios: Vec<PortfolioConfig>) -> Self {
        Self {
            portfolios: RwLock::new(
                portfolios
                    .into_iter()
                    .map(|p| (p.id.clone(), p))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl PortfolioStore for MemoryPortfolioStore {
    async fn get_portfolio(&self, id: &str) -> Result<PortfolioConfig, DataError> {
        let portfolios = self.portfolios.read().unwrap();
        portfolios
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::PortfolioNotFound(id.to_string()))
    }

    async fn list_portfolios(&self) -> Result<Vec<PortfolioConfig>, DataError> {
        let portfolios = self.portfolios.read().unwrap();
        let mut all: Vec<PortfolioConfig> = portfolios.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn set_automation_enabled(&self, id: &str, enabled: bool) -> Result<(), DataError> {
        let mut portfolios = self.portfolios.write().unwrap();
        let portfolio = portfolios
            .get_mut(id)
            .ok_or_else(|| DataError::PortfolioNotFound(id.to_string()))?;
        portfolio.automated_trading_enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn portfolio(id: &str, enabled: bool) -> PortfolioConfig {
        PortfolioConfig {
            id: id.to_string(),
            automated_trading_enabled: enabled,
            initial_capital: dec!(100000),
            strategies: vec![],
        }
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let store = MemoryPortfolioStore::new(vec![portfolio("b", true), portfolio("a", false)]);

        assert_eq!(store.get_portfolio("a").await.unwrap().id, "a");

        let all = store.list_portfolios().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
    }

    #[tokio::test]
    async fn test_unknown_portfolio() {
        let store = MemoryPortfolioStore::new(vec![]);
        let err = store.get_portfolio("ghost").await.unwrap_err();
        assert!(matches!(err, DataError::PortfolioNotFound(_)));
    }

    #[tokio::test]
    async fn test_toggle_automation() {
        let store = MemoryPortfolioStore::new(vec![portfolio("p1", false)]);

        store.set_automation_enabled("p1", true).await.unwrap();
        assert!(store.get_portfolio("p1").await.unwrap().automated_trading_enabled);

        store.set_automation_enabled("p1", false).await.unwrap();
        assert!(!store.get_portfolio("p1").await.unwrap().automated_trading_enabled);
    }
}
