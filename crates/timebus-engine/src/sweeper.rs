//! # Due-Timeout Sweeper
//!
//! One sweep = one transaction: check out everything due, build and send
//! every reply in due order, then commit. Any failure rolls the whole batch
//! back and the next tick retries it in full, so delivery is at-least-once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::codec::PayloadCodec;
use crate::domain::TimeoutRecord;
use crate::error::SweepError;
use crate::ports::{BusGateway, Clock, TimeoutStore};

/// What one sweep call accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// Nothing was due.
    Idle,
    /// Every due record's reply was sent and the batch was committed.
    Delivered(usize),
    /// Another sweep was still running; this call touched nothing.
    Skipped,
}

/// Executes sweep transactions over the store, codec, and gateway.
pub struct Sweeper {
    store: Arc<dyn TimeoutStore>,
    gateway: Arc<dyn BusGateway>,
    codec: Arc<PayloadCodec>,
    clock: Arc<dyn Clock>,
    in_progress: AtomicBool,
}

impl Sweeper {
    /// Wires a sweeper to its collaborators.
    pub fn new(
        store: Arc<dyn TimeoutStore>,
        gateway: Arc<dyn BusGateway>,
        codec: Arc<PayloadCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            gateway,
            codec,
            clock,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Runs one sweep transaction.
    ///
    /// Overlap protection: if a sweep is already running on this instance
    /// the call returns [`SweepOutcome::Skipped`] without touching the
    /// store. Ticks are dropped, never queued.
    ///
    /// # Errors
    ///
    /// Any [`SweepError`] means the checked-out batch was rolled back and
    /// every record in it is pending again.
    pub async fn sweep_once(&self) -> Result<SweepOutcome, SweepError> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sweep already in progress, skipping tick");
            return Ok(SweepOutcome::Skipped);
        }

        let outcome = self.run_transaction().await;
        self.in_progress.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run_transaction(&self) -> Result<SweepOutcome, SweepError> {
        let now = self.clock.now();
        let Some(batch) = self.store.checkout_due(now).await? else {
            return Ok(SweepOutcome::Idle);
        };

        debug!(batch_id = %batch.id, records = batch.len(), "due batch checked out");

        for record in &batch.records {
            if let Err(error) = self.deliver(record).await {
                warn!(
                    batch_id = %batch.id,
                    correlation_id = %record.correlation_id,
                    error = %error,
                    "sweep failed, rolling back batch"
                );
                let restored = self.store.rollback(batch.id).await?;
                debug!(batch_id = %batch.id, restored, "batch rolled back");
                return Err(error);
            }
        }

        let delivered = self.store.commit(batch.id).await?;
        info!(batch_id = %batch.id, delivered, "due timeouts delivered");
        Ok(SweepOutcome::Delivered(delivered))
    }

    async fn deliver(&self, record: &TimeoutRecord) -> Result<(), SweepError> {
        let reply = self
            .codec
            .build_reply(record)
            .map_err(|source| SweepError::Codec {
                correlation_id: record.correlation_id.clone(),
                source,
            })?;

        info!(timeout = %record, "due timeout expired, returning reply");

        self.gateway
            .send(&record.reply_to, reply)
            .await
            .map_err(|source| SweepError::Gateway {
                correlation_id: record.correlation_id.clone(),
                source,
            })
    }
}
