//! # Payload Codec
//!
//! Turns stored records into replies. Payload data round-trips through an
//! explicit registry keyed by type tag: every payload type a deployment
//! expects must be registered up front, and a record whose tag has no
//! registration is a configuration error surfaced when the reply is built.
//!
//! Intake never consults the registry. A request with an unknown tag is
//! stored as-is and fails on the sweep that tries to deliver it, so a
//! missing registration shows up in the service's logs rather than as a
//! silently dropped request.

use std::collections::HashMap;
use std::fmt;

use timebus_messages::{TimeoutData, TimeoutPayload, TimeoutReply, TimeoutRequest};

use crate::domain::TimeoutRecord;
use crate::error::CodecError;

/// A registered reconstructor: proves a stored value still has the
/// registered shape and returns its canonical serialized form.
type Reconstructor =
    Box<dyn Fn(&serde_json::Value) -> Result<serde_json::Value, serde_json::Error> + Send + Sync>;

/// Registry-backed reply builder.
pub struct PayloadCodec {
    reconstructors: HashMap<&'static str, Reconstructor>,
}

impl PayloadCodec {
    /// An empty registry. Sufficient for deployments whose requests never
    /// carry payload data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reconstructors: HashMap::new(),
        }
    }

    /// Registers the payload type `T` under its wire tag. Re-registering a
    /// tag replaces the previous entry.
    pub fn register<T: TimeoutData>(&mut self) -> &mut Self {
        self.reconstructors.insert(
            T::TYPE_TAG,
            Box::new(|value| {
                let typed: T = serde_json::from_value(value.clone())?;
                serde_json::to_value(&typed)
            }),
        );
        self
    }

    /// True when a payload type is registered for `tag`.
    #[must_use]
    pub fn is_registered(&self, tag: &str) -> bool {
        self.reconstructors.contains_key(tag)
    }

    /// Lifts the payload out of an inbound request for storage.
    ///
    /// Which variant the request carries was fixed by the requester's
    /// constructor call; nothing is probed here, and unregistered tags are
    /// accepted (they fail at reply construction, not at intake).
    #[must_use]
    pub fn capture(&self, request: &TimeoutRequest) -> Option<TimeoutPayload> {
        request.payload.clone()
    }

    /// Builds the reply for a due record.
    ///
    /// The reply's due time is the record's stored instant, not the moment
    /// of building, so late delivery stays observable to the requester.
    ///
    /// # Errors
    ///
    /// [`CodecError::UnregisteredType`] when the record's payload tag has no
    /// registration; [`CodecError::Reconstruct`] when the stored value no
    /// longer has the registered shape.
    pub fn build_reply(&self, record: &TimeoutRecord) -> Result<TimeoutReply, CodecError> {
        let Some(payload) = &record.payload else {
            return Ok(TimeoutReply::new(
                record.time_to_return,
                record.correlation_id.clone(),
            ));
        };

        let reconstruct = self
            .reconstructors
            .get(payload.type_tag.as_str())
            .ok_or_else(|| CodecError::UnregisteredType(payload.type_tag.clone()))?;

        let value = reconstruct(&payload.value).map_err(|source| CodecError::Reconstruct {
            tag: payload.type_tag.clone(),
            source,
        })?;

        Ok(TimeoutReply::with_payload(
            record.time_to_return,
            record.correlation_id.clone(),
            TimeoutPayload {
                type_tag: payload.type_tag.clone(),
                value,
            },
        ))
    }
}

impl Default for PayloadCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.reconstructors.keys().copied().collect();
        tags.sort_unstable();
        f.debug_struct("PayloadCodec")
            .field("registered_tags", &tags)
            .finish()
    }
}
