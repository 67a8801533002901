//! In-memory timeout store.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BatchId, DueBatch, StoreStatus, TimeoutLedger, TimeoutRecord};
use crate::error::StoreError;
use crate::ports::TimeoutStore;

/// Process-lifetime store: the pure ledger behind a mutex.
///
/// Suitable for single-node operation and tests. Records do not survive a
/// restart; deployments that need durability plug their own `TimeoutStore`
/// implementation into the same port.
///
/// The mutex is synchronous and held only for the ledger operation itself,
/// never across an await point.
#[derive(Debug)]
pub struct InMemoryTimeoutStore {
    ledger: Mutex<TimeoutLedger>,
}

impl InMemoryTimeoutStore {
    /// An unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ledger: Mutex::new(TimeoutLedger::new()),
        }
    }

    /// A store that refuses new records beyond `capacity`.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            ledger: Mutex::new(TimeoutLedger::bounded(capacity)),
        }
    }

    fn ledger(&self) -> Result<MutexGuard<'_, TimeoutLedger>, StoreError> {
        self.ledger
            .lock()
            .map_err(|_| StoreError::Backend("ledger mutex poisoned".to_string()))
    }
}

impl Default for InMemoryTimeoutStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimeoutStore for InMemoryTimeoutStore {
    async fn add(&self, record: TimeoutRecord) -> Result<(), StoreError> {
        self.ledger()?.add(record)
    }

    async fn checkout_due(&self, now: DateTime<Utc>) -> Result<Option<DueBatch>, StoreError> {
        Ok(self.ledger()?.checkout_due(now))
    }

    async fn commit(&self, batch: BatchId) -> Result<usize, StoreError> {
        self.ledger()?.commit(batch)
    }

    async fn rollback(&self, batch: BatchId) -> Result<usize, StoreError> {
        self.ledger()?.rollback(batch)
    }

    async fn status(&self) -> Result<StoreStatus, StoreError> {
        Ok(self.ledger()?.status())
    }
}
