//! Error types for the engine.
//!
//! Each port has its own error enum; [`SweepError`] aggregates everything
//! that can abort one sweep transaction.

use thiserror::Error;

use timebus_messages::Endpoint;

use crate::domain::BatchId;

/// Errors raised by a timeout store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused a new record because its capacity bound is reached.
    /// The record was not stored.
    #[error("timeout store capacity exhausted ({capacity} records)")]
    CapacityExhausted { capacity: usize },

    /// A commit or rollback named a batch the store does not know. Either
    /// the id is stale (already committed or rolled back) or it never came
    /// from this store.
    #[error("unknown checkout batch {0}")]
    UnknownBatch(BatchId),

    /// The backing persistence failed.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Errors raised while turning a stored record into a reply.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The record's payload tag has no registered payload type. A service
    /// configuration error: a `register` call is missing for the tag.
    #[error("no payload type registered for tag `{0}`")]
    UnregisteredType(String),

    /// The stored payload no longer deserializes as the registered type.
    #[error("payload for tag `{tag}` failed to reconstruct")]
    Reconstruct {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by the bus gateway when sending a reply.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The destination endpoint is not known to the gateway.
    #[error("no mailbox registered for endpoint `{0}`")]
    UnknownEndpoint(Endpoint),

    /// The endpoint is known but the reply could not be handed over.
    #[error("delivery to endpoint `{endpoint}` failed: {reason}")]
    Delivery { endpoint: Endpoint, reason: String },
}

/// Errors raised while dispatching an inbound delivery.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A message kind the service does not handle reached its input queue.
    /// A routing error on the sender's side; the delivery is never retried
    /// by the handler.
    #[error("unsupported message type `{type_tag}` on the timeout input queue")]
    UnsupportedMessage { type_tag: String },

    /// The store rejected the new record; the request is not scheduled and
    /// the transport decides whether to redeliver.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that abort one sweep transaction.
///
/// Whatever the cause, the effect is the same: the checked-out batch rolls
/// back, every record in it becomes pending again, and the next tick
/// retries the whole batch.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The store failed during checkout, commit, or rollback.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reply construction failed for the named record.
    #[error("reply for correlation `{correlation_id}` could not be built")]
    Codec {
        correlation_id: String,
        #[source]
        source: CodecError,
    },

    /// The gateway refused the reply for the named record.
    #[error("reply for correlation `{correlation_id}` could not be sent")]
    Gateway {
        correlation_id: String,
        #[source]
        source: GatewayError,
    },
}
