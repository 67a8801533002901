//! # Request/Reply Contracts
//!
//! The two messages of the timeout protocol and the payload carrier that
//! lets a reply transport arbitrary requester-defined data.
//!
//! A requester that wants data carried back implements [`TimeoutData`] for
//! its type and builds the request with [`TimeoutRequest::with_payload`].
//! The service stores the captured payload verbatim and hands it back on the
//! reply, where [`TimeoutReply::payload_as`] restores the concrete type.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A payload type that can ride along on a timeout round trip.
///
/// The `TYPE_TAG` names the type on the wire and in the service's payload
/// registry. Tags are part of the protocol: renaming one breaks replies for
/// requests already stored under the old tag.
pub trait TimeoutData: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable wire name for this payload type.
    const TYPE_TAG: &'static str;
}

/// A captured payload: the declared type tag plus the serialized value.
///
/// The pairing is enforced by construction; there is no way to obtain a
/// tag without the matching value or vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPayload {
    /// The `TYPE_TAG` the value was captured under.
    pub type_tag: String,
    /// The serialized payload value.
    pub value: serde_json::Value,
}

impl TimeoutPayload {
    /// Captures a typed value for transport.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Serialization`] if the value cannot be
    /// serialized (e.g. a map with non-string keys).
    pub fn capture<T: TimeoutData>(data: &T) -> Result<Self, ContractError> {
        Ok(Self {
            type_tag: T::TYPE_TAG.to_string(),
            value: serde_json::to_value(data)?,
        })
    }

    /// Restores the concrete payload type.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::TagMismatch`] if the payload was captured
    /// under a different tag, or [`ContractError::Serialization`] if the
    /// stored value no longer deserializes as `T`.
    pub fn extract<T: TimeoutData>(&self) -> Result<T, ContractError> {
        if self.type_tag != T::TYPE_TAG {
            return Err(ContractError::TagMismatch {
                expected: T::TYPE_TAG,
                found: self.type_tag.clone(),
            });
        }
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// Errors raised while capturing or restoring payload data.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The payload was captured under a different type tag.
    #[error("payload type tag mismatch: expected `{expected}`, found `{found}`")]
    TagMismatch {
        expected: &'static str,
        found: String,
    },

    /// Serialization or deserialization of the payload value failed.
    #[error("payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A request to be sent a reply after a delay.
///
/// Sent by a requester to the service's input queue. The service replies to
/// the envelope's return address no earlier than `timeout` after receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutRequest {
    /// How long after receipt the reply becomes due. Zero is legal; the
    /// reply is then due on the service's next sweep.
    pub timeout: Duration,

    /// Opaque requester-chosen token, echoed verbatim in the reply.
    /// The service never interprets it and never requires uniqueness.
    pub correlation_id: String,

    /// Optional requester data to carry back with the reply.
    pub payload: Option<TimeoutPayload>,
}

impl TimeoutRequest {
    /// Builds a plain request with no payload data.
    pub fn new(timeout: Duration, correlation_id: impl Into<String>) -> Self {
        Self {
            timeout,
            correlation_id: correlation_id.into(),
            payload: None,
        }
    }

    /// Builds a request carrying typed payload data.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Serialization`] if the payload value cannot
    /// be serialized.
    pub fn with_payload<T: TimeoutData>(
        timeout: Duration,
        correlation_id: impl Into<String>,
        data: &T,
    ) -> Result<Self, ContractError> {
        Ok(Self {
            timeout,
            correlation_id: correlation_id.into(),
            payload: Some(TimeoutPayload::capture(data)?),
        })
    }
}

/// The reply sent back once a timeout elapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutReply {
    /// The instant the timeout was originally scheduled to elapse.
    /// This is the stored due time, not the moment of delivery, so the
    /// requester can measure how late the reply actually arrived.
    pub due_time: DateTime<Utc>,

    /// The request's correlation token, echoed verbatim.
    pub correlation_id: String,

    /// The payload captured at request time, if any.
    pub payload: Option<TimeoutPayload>,
}

impl TimeoutReply {
    /// Builds a reply without payload data.
    pub fn new(due_time: DateTime<Utc>, correlation_id: impl Into<String>) -> Self {
        Self {
            due_time,
            correlation_id: correlation_id.into(),
            payload: None,
        }
    }

    /// Builds a reply carrying a captured payload.
    pub fn with_payload(
        due_time: DateTime<Utc>,
        correlation_id: impl Into<String>,
        payload: TimeoutPayload,
    ) -> Self {
        Self {
            due_time,
            correlation_id: correlation_id.into(),
            payload: Some(payload),
        }
    }

    /// Restores the typed payload, if one was captured.
    ///
    /// Returns `Ok(None)` for a payload-free reply.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::TagMismatch`] if the payload belongs to a
    /// different type, or [`ContractError::Serialization`] if the value no
    /// longer deserializes as `T`.
    pub fn payload_as<T: TimeoutData>(&self) -> Result<Option<T>, ContractError> {
        self.payload.as_ref().map(TimeoutPayload::extract).transpose()
    }
}
