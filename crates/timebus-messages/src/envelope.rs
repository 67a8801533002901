//! # Transport Envelope
//!
//! What the transport hands the service for each inbound delivery: the
//! sender's return address plus the decoded message body. The return address
//! travels here explicitly; handlers never consult ambient dispatch state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contracts::{TimeoutReply, TimeoutRequest};

/// A logical queue address a reply can be sent to.
///
/// Endpoints are compared as opaque strings; the transport decides what the
/// name resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint(String);

impl Endpoint {
    /// Wraps a queue name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The queue name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The decoded body of an inbound delivery, classified for dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageBody {
    /// A timeout scheduling request; the one message the service acts on.
    Request(TimeoutRequest),

    /// A stray message of the service's own protocol, e.g. a reply routed
    /// back by a misconfigured requester. Skipped without error.
    Reply(TimeoutReply),

    /// A delivery with no declared type. Skipped without error.
    Untyped,

    /// Any other decodable message kind. Reaching the service's input queue
    /// with one of these is a routing error.
    Foreign {
        /// The wire name of the unexpected kind, for diagnostics.
        type_tag: String,
    },
}

/// One inbound delivery: the classified body plus the return address the
/// transport attributed to the sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportEnvelope {
    /// Where a reply for this delivery must be sent.
    pub return_address: Endpoint,
    /// The decoded body.
    pub body: MessageBody,
}

impl TransportEnvelope {
    /// Wraps a timeout request from the given sender.
    pub fn request(return_address: Endpoint, request: TimeoutRequest) -> Self {
        Self {
            return_address,
            body: MessageBody::Request(request),
        }
    }

    /// Wraps a message kind the service does not handle.
    pub fn foreign(return_address: Endpoint, type_tag: impl Into<String>) -> Self {
        Self {
            return_address,
            body: MessageBody::Foreign {
                type_tag: type_tag.into(),
            },
        }
    }
}
