//! # Request Intake
//!
//! Dispatches deliveries from the service's input queue: timeout requests
//! become stored records, skippable kinds are logged and dropped, anything
//! else is rejected as a routing error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use timebus_messages::{Endpoint, MessageBody, TimeoutRequest, TransportEnvelope};

use crate::codec::PayloadCodec;
use crate::domain::TimeoutRecord;
use crate::error::HandlerError;
use crate::ports::{Clock, Dispatch, MessageHandler, TimeoutStore};

/// Turns inbound timeout requests into stored records.
pub struct TimeoutRequestHandler {
    store: Arc<dyn TimeoutStore>,
    codec: Arc<PayloadCodec>,
    clock: Arc<dyn Clock>,
}

impl TimeoutRequestHandler {
    /// Wires the handler to its store, payload codec, and time source.
    pub fn new(store: Arc<dyn TimeoutStore>, codec: Arc<PayloadCodec>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            codec,
            clock,
        }
    }

    async fn schedule(
        &self,
        return_address: Endpoint,
        request: TimeoutRequest,
    ) -> Result<Dispatch, HandlerError> {
        // The due instant is fixed here, exactly once. Nothing downstream
        // recomputes it; delivery lateness stays observable to the requester.
        let time_to_return = due_instant(self.clock.now(), request.timeout);

        let payload = self.codec.capture(&request);
        let record = TimeoutRecord::new(return_address, request.correlation_id, time_to_return, payload);

        let correlation_id = record.correlation_id.clone();
        let reply_to = record.reply_to.clone();
        self.store.add(record).await?;

        info!(
            correlation_id = %correlation_id,
            reply_to = %reply_to,
            due_time = %time_to_return,
            "timeout request stored"
        );
        Ok(Dispatch::Scheduled)
    }
}

/// Receipt instant plus the requested delay. Delays too large for the
/// calendar saturate to the far future: stored, never due.
fn due_instant(now: DateTime<Utc>, timeout: std::time::Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(timeout)
        .ok()
        .and_then(|delay| now.checked_add_signed(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl MessageHandler for TimeoutRequestHandler {
    async fn dispatch(&self, envelope: TransportEnvelope) -> Result<Dispatch, HandlerError> {
        match envelope.body {
            MessageBody::Request(request) => self.schedule(envelope.return_address, request).await,

            MessageBody::Reply(reply) => {
                debug!(
                    correlation_id = %reply.correlation_id,
                    "stray timeout reply on input queue, skipping"
                );
                Ok(Dispatch::Ignored)
            }

            MessageBody::Untyped => {
                debug!("untyped message on input queue, skipping");
                Ok(Dispatch::Ignored)
            }

            MessageBody::Foreign { type_tag } => {
                warn!(type_tag = %type_tag, "unsupported message type on input queue");
                Err(HandlerError::UnsupportedMessage { type_tag })
            }
        }
    }
}
