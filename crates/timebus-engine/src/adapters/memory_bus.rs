//! In-memory bus gateway.
//!
//! Delivers replies into per-endpoint mailboxes. Suitable for single-node
//! operation and tests; distributed deployments put a broker-backed
//! [`BusGateway`] behind the same port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use timebus_messages::{Endpoint, TimeoutReply};

use crate::error::GatewayError;
use crate::ports::BusGateway;

/// Default mailbox capacity for registered endpoints.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Single-process gateway with one bounded mailbox per registered endpoint.
///
/// A full mailbox fails the send instead of blocking it, so a stalled
/// consumer shows up as a delivery error (and a sweep rollback) rather than
/// as a wedged sweep loop.
pub struct InMemoryBusGateway {
    mailboxes: RwLock<HashMap<Endpoint, mpsc::Sender<TimeoutReply>>>,
    /// Remaining sends to fail artificially; tests exercising the rollback
    /// path count this down.
    fail_next_sends: AtomicUsize,
    capacity: usize,
}

impl InMemoryBusGateway {
    /// A gateway with the default mailbox capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// A gateway whose mailboxes hold up to `capacity` undelivered replies.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mailboxes: RwLock::new(HashMap::new()),
            fail_next_sends: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Registers a mailbox for `endpoint`, returning the receiving half.
    /// Re-registering an endpoint replaces its previous mailbox.
    pub fn register(&self, endpoint: Endpoint) -> mpsc::Receiver<TimeoutReply> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        if let Ok(mut mailboxes) = self.mailboxes.write() {
            mailboxes.insert(endpoint.clone(), sender);
        }
        debug!(endpoint = %endpoint, "mailbox registered");
        receiver
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.mailboxes.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Makes the next `count` sends fail with a delivery error.
    pub fn fail_next_sends(&self, count: usize) {
        self.fail_next_sends.store(count, Ordering::SeqCst);
    }

    /// Consumes one injected-failure token, if any remain.
    fn take_failure_token(&self) -> bool {
        self.fail_next_sends
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for InMemoryBusGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusGateway for InMemoryBusGateway {
    async fn send(
        &self,
        destination: &Endpoint,
        reply: TimeoutReply,
    ) -> Result<(), GatewayError> {
        if self.take_failure_token() {
            return Err(GatewayError::Delivery {
                endpoint: destination.clone(),
                reason: "injected delivery failure".to_string(),
            });
        }

        // Clone the sender out so the registry lock is released before
        // handing the reply over.
        let sender = {
            let Ok(mailboxes) = self.mailboxes.read() else {
                return Err(GatewayError::Delivery {
                    endpoint: destination.clone(),
                    reason: "mailbox registry poisoned".to_string(),
                });
            };
            mailboxes.get(destination).cloned()
        };

        let Some(sender) = sender else {
            return Err(GatewayError::UnknownEndpoint(destination.clone()));
        };

        sender.try_send(reply).map_err(|e| {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "mailbox full",
                mpsc::error::TrySendError::Closed(_) => "mailbox closed",
            };
            GatewayError::Delivery {
                endpoint: destination.clone(),
                reason: reason.to_string(),
            }
        })?;

        debug!(endpoint = %destination, "reply delivered");
        Ok(())
    }
}
