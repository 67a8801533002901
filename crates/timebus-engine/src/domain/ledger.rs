//! # Timeout Ledger
//!
//! Pure two-phase scheduling state: a pending index ordered by due instant
//! and a set of in-flight batches awaiting commit or rollback.
//!
//! Records are NEVER deleted when checked out. Deletion occurs ONLY on
//! commit; a rollback reinstates the batch under its original ordering keys,
//! as if the checkout had never happened.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::record::TimeoutRecord;
use crate::error::StoreError;

/// Identifier of one checked-out batch of due records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(Uuid);

impl BatchId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordering key of the pending index: due instant first, insertion sequence
/// as the tie-break so records with equal instants keep arrival order.
type DueKey = (DateTime<Utc>, u64);

/// A checked-out batch of due records, in ascending due order.
#[derive(Debug)]
pub struct DueBatch {
    /// Handle for the later commit or rollback.
    pub id: BatchId,
    /// The due records, oldest obligation first.
    pub records: Vec<TimeoutRecord>,
}

impl DueBatch {
    /// Number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the batch holds no records. A checkout never produces an
    /// empty batch; this exists for symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ledger counters exposed for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    /// Records waiting for their due instant.
    pub pending: usize,
    /// Records checked out by a sweep, awaiting commit or rollback.
    pub in_flight: usize,
    /// Due instant of the earliest pending record.
    pub next_due: Option<DateTime<Utc>>,
}

/// Pure two-phase scheduling state.
///
/// All methods are synchronous; callers wrap the ledger in whatever locking
/// their concurrency model needs.
#[derive(Debug, Default)]
pub struct TimeoutLedger {
    /// Pending records, ordered by (due instant, insertion sequence).
    pending: BTreeMap<DueKey, TimeoutRecord>,
    /// Checked-out batches. Entries keep their original pending keys so a
    /// rollback restores due-order position exactly.
    in_flight: HashMap<BatchId, Vec<(DueKey, TimeoutRecord)>>,
    /// Monotonic insertion counter feeding the pending-key tie-break.
    next_seq: u64,
    /// Optional bound on total held records (pending plus in-flight).
    capacity: Option<usize>,
}

impl TimeoutLedger {
    /// An unbounded ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that refuses new records beyond `capacity`.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Inserts a record into the pending index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExhausted`] when the bound is reached;
    /// the record is not stored.
    pub fn add(&mut self, record: TimeoutRecord) -> Result<(), StoreError> {
        if let Some(capacity) = self.capacity {
            if self.len() >= capacity {
                return Err(StoreError::CapacityExhausted { capacity });
            }
        }

        let key = (record.time_to_return, self.next_seq);
        self.next_seq += 1;
        self.pending.insert(key, record);
        Ok(())
    }

    /// Moves every record due at `now` into a fresh in-flight batch
    /// (checkout phase of the two-phase sweep).
    ///
    /// Returns `None` when nothing is due. Records come out in ascending
    /// due order and stay invisible to later checkouts until a rollback
    /// reinstates them.
    pub fn checkout_due(&mut self, now: DateTime<Utc>) -> Option<DueBatch> {
        let mut taken: Vec<(DueKey, TimeoutRecord)> = Vec::new();

        while let Some(entry) = self.pending.first_entry() {
            if !entry.get().is_due(now) {
                break;
            }
            let (key, record) = entry.remove_entry();
            taken.push((key, record));
        }

        if taken.is_empty() {
            return None;
        }

        let id = BatchId::fresh();
        let records = taken.iter().map(|(_, record)| record.clone()).collect();
        self.in_flight.insert(id, taken);

        Some(DueBatch { id, records })
    }

    /// Permanently discards a delivered batch (commit phase). The records
    /// can never be handed out again.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownBatch`] for a stale or foreign id.
    pub fn commit(&mut self, batch: BatchId) -> Result<usize, StoreError> {
        let records = self
            .in_flight
            .remove(&batch)
            .ok_or(StoreError::UnknownBatch(batch))?;
        Ok(records.len())
    }

    /// Reinstates a failed batch as pending (rollback phase), under the
    /// original due-order keys.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownBatch`] for a stale or foreign id.
    pub fn rollback(&mut self, batch: BatchId) -> Result<usize, StoreError> {
        let records = self
            .in_flight
            .remove(&batch)
            .ok_or(StoreError::UnknownBatch(batch))?;

        let count = records.len();
        for (key, record) in records {
            self.pending.insert(key, record);
        }
        Ok(count)
    }

    /// Total records held, pending plus in-flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + self.in_flight.values().map(Vec::len).sum::<usize>()
    }

    /// True when the ledger holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_empty()
    }

    /// Current counters.
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            pending: self.pending.len(),
            in_flight: self.in_flight.values().map(Vec::len).sum(),
            next_due: self.pending.keys().next().map(|(due, _)| *due),
        }
    }
}
