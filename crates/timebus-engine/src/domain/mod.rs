//! # Domain Layer
//!
//! Pure scheduling state: the timeout record entity and the two-phase
//! pending/in-flight ledger. No I/O, no locks, no async; adapters wrap this
//! layer in whatever concurrency their backend needs.

pub mod ledger;
pub mod record;

pub use ledger::{BatchId, DueBatch, StoreStatus, TimeoutLedger};
pub use record::TimeoutRecord;
