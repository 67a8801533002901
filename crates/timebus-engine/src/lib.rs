//! # Timeout Scheduling Engine
//!
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Accepts "send me a reply in D" requests, persists them as timeout records,
//! and delivers the replies once due. Replies go to the return address the
//! request arrived with and carry back any payload data the requester
//! attached, restored to its original type.
//!
//! ## Two-Phase Sweep Protocol
//!
//! Due records are NEVER deleted when handed to a sweep. Deletion occurs ONLY
//! after every reply of the batch was accepted by the bus gateway.
//!
//! ```text
//! [PENDING] ──checkout──→ [IN_FLIGHT] ──commit──→ [DELIVERED]
//!                              │
//!                              └── codec/send failure ──→ [PENDING]
//! ```
//!
//! | Stage | Method | Effect |
//! |-------|--------|--------|
//! | Checkout | `store.checkout_due()` | Move due records to an in-flight batch |
//! | Commit | `store.commit()` | Permanently delete the batch |
//! | Rollback | `store.rollback()` | Return the batch to PENDING |
//!
//! A rolled-back batch is retried in full on a later sweep, so delivery is
//! at-least-once: a requester may see a duplicate reply after a partial
//! failure, but never a lost one.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - In-memory store and bus gateway implementations    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - MessageHandler trait                       │
//! │  ports/outbound.rs - TimeoutStore, BusGateway, Clock traits     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/record.rs - TimeoutRecord entity                        │
//! │  domain/ledger.rs - TimeoutLedger with due-order index          │
//! │  codec.rs         - PayloadCodec type-tag registry              │
//! │  error.rs         - Store/Codec/Gateway/Handler/Sweep errors    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The orchestration layer on top: [`handler::TimeoutRequestHandler`] for
//! intake, [`sweeper::Sweeper`] for one sweep transaction, and
//! [`service::TimeoutService`] for the recurring loop and lifecycle.

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod handler;
pub mod ports;
pub mod service;
pub mod sweeper;

pub use codec::PayloadCodec;
pub use config::ServiceConfig;
pub use domain::{StoreStatus, TimeoutRecord};
pub use error::{CodecError, GatewayError, HandlerError, StoreError, SweepError};
pub use handler::TimeoutRequestHandler;
pub use ports::{Dispatch, MessageHandler};
pub use service::TimeoutService;
pub use sweeper::{SweepOutcome, Sweeper};
