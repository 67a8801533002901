//! Inbound (Driving) ports for the timeout service.

use async_trait::async_trait;

use timebus_messages::TransportEnvelope;

use crate::error::HandlerError;

/// What became of a successfully dispatched delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The request was durably stored; a reply will follow once due.
    Scheduled,
    /// The delivery was a skippable kind (untyped, or a stray message of
    /// the service's own protocol). Nothing was stored.
    Ignored,
}

/// Entry point the transport drives for every delivery addressed to the
/// service's input queue.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Dispatches one inbound delivery.
    ///
    /// # Errors
    ///
    /// [`HandlerError::UnsupportedMessage`] for message kinds the service
    /// does not handle, [`HandlerError::Store`] when the request could not
    /// be durably stored.
    async fn dispatch(&self, envelope: TransportEnvelope) -> Result<Dispatch, HandlerError>;
}
