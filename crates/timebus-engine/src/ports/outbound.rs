//! Outbound (Driven) ports for the timeout service.
//!
//! These traits define the dependencies the engine needs for operation:
//! durable record storage, the bus for sending replies, and a time source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use timebus_messages::{Endpoint, TimeoutReply};

use crate::domain::{BatchId, DueBatch, StoreStatus, TimeoutRecord};
use crate::error::{GatewayError, StoreError};

/// Durable storage for timeout records with two-phase checkout.
///
/// The checkout/commit/rollback triple is the store's transaction surface:
/// a sweep checks out everything due, and either commits (records are gone
/// for good) or rolls back (records are pending again, as if untouched).
/// Implementations must keep records of an in-flight batch invisible to
/// concurrent checkouts.
#[async_trait]
pub trait TimeoutStore: Send + Sync {
    /// Stores a new record. Must be safe to call while a checkout is in
    /// flight; the record then joins the pending set, never the open batch.
    async fn add(&self, record: TimeoutRecord) -> Result<(), StoreError>;

    /// Atomically checks out every record due at `now`, in ascending due
    /// order. `Ok(None)` when nothing is due.
    async fn checkout_due(&self, now: DateTime<Utc>) -> Result<Option<DueBatch>, StoreError>;

    /// Discards a delivered batch permanently. Returns the record count.
    async fn commit(&self, batch: BatchId) -> Result<usize, StoreError>;

    /// Reinstates a failed batch as pending. Returns the record count.
    async fn rollback(&self, batch: BatchId) -> Result<usize, StoreError>;

    /// Current counters, for logs and health surfaces.
    async fn status(&self) -> Result<StoreStatus, StoreError>;
}

/// The bus the service sends replies through.
///
/// The engine only ever sends; receiving requests is the transport's side
/// and arrives through the inbound port.
#[async_trait]
pub trait BusGateway: Send + Sync {
    /// Sends a reply to the given endpoint. An `Ok` means the bus accepted
    /// the message; a sweep treats anything else as grounds for rollback.
    async fn send(&self, destination: &Endpoint, reply: TimeoutReply)
        -> Result<(), GatewayError>;
}

/// Time source for consistent due-time handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Default wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests and simulations.
///
/// Public rather than test-gated so downstream test suites can drive the
/// engine through arbitrary time without waiting on the wall clock.
#[derive(Debug)]
pub struct ManualClock {
    epoch_millis: std::sync::atomic::AtomicI64,
}

impl ManualClock {
    /// A clock frozen at the given instant until told otherwise.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            epoch_millis: std::sync::atomic::AtomicI64::new(now.timestamp_millis()),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        self.epoch_millis
            .fetch_add(by.num_milliseconds(), std::sync::atomic::Ordering::SeqCst);
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        self.epoch_millis
            .store(now.timestamp_millis(), std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.epoch_millis.load(std::sync::atomic::Ordering::SeqCst);
        DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
