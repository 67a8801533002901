//! # Adapters Layer
//!
//! In-process implementations of the outbound ports: a mutex-wrapped ledger
//! for storage and a mailbox-based gateway for reply delivery. Durable or
//! broker-backed deployments replace these behind the same traits.

pub mod memory_bus;
pub mod memory_store;

pub use memory_bus::InMemoryBusGateway;
pub use memory_store::InMemoryTimeoutStore;
