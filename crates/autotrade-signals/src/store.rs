//! In-memory signal store.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

use autotrade_core::error::SignalError;
use autotrade_core::traits::{RecordOutcome, SignalStore};
use autotrade_core::types::{FillReport, SignalKey, TimeWindow, TradingSignal};

#[derive(Default)]
struct Inner {
    signals: HashMap<Uuid, TradingSignal>,
    /// Insertion order, oldest first
    order: Vec<Uuid>,
    /// Dedupe keys of every recorded signal
    keys: HashSet<SignalKey>,
}

/// In-memory implementation of the signal store.
pub struct MemorySignalStore {
    inner: RwLock<Inner>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Fetch one signal by id.
    pub fn get(&self, id: Uuid) -> Option<TradingSignal> {
        self.inner.read().unwrap().signals.get(&id).cloned()
    }
}

impl Default for MemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn record(
        &self,
        signal: TradingSignal,
        key: SignalKey,
    ) -> Result<RecordOutcome, SignalError> {
        let mut inner = self.inner.write().unwrap();
        if inner.keys.contains(&key) {
            return Ok(RecordOutcome::Duplicate);
        }
        inner.keys.insert(key);
        inner.order.push(signal.id);
        inner.signals.insert(signal.id, signal);
        Ok(RecordOutcome::Inserted)
    }

    async fn mark_executed(&self, id: Uuid, fill: &FillReport) -> Result<(), SignalError> {
        let mut inner = self.inner.write().unwrap();
        let signal = inner
            .signals
            .get_mut(&id)
            .ok_or(SignalError::NotFound(id))?;
        signal.mark_executed(fill)
    }

    async fn backfill_profit_loss(
        &self,
        id: Uuid,
        profit_loss: Decimal,
    ) -> Result<(), SignalError> {
        let mut inner = self.inner.write().unwrap();
        let signal = inner
            .signals
            .get_mut(&id)
            .ok_or(SignalError::NotFound(id))?;
        match signal.execution_details.as_mut() {
            Some(details) => {
                details.profit_loss = Some(profit_loss);
                Ok(())
            }
            None => Err(SignalError::Store(format!(
                "signal {id} has no execution to backfill"
            ))),
        }
    }

    async fn pending(&self, portfolio_id: &str) -> Result<Vec<TradingSignal>, SignalError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.signals.get(id))
            .filter(|s| !s.executed && s.portfolio_id == portfolio_id)
            .cloned()
            .collect())
    }

    async fn in_window(
        &self,
        portfolio_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<TradingSignal>, SignalError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.signals.get(id))
            .filter(|s| s.portfolio_id == portfolio_id && window.contains(s.timestamp))
            .cloned()
            .collect())
    }
}
