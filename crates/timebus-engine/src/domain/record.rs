//! The timeout record entity.

use std::fmt;

use chrono::{DateTime, Utc};

use timebus_messages::{Endpoint, TimeoutPayload};

/// One persisted delayed-reply obligation.
///
/// Created at request intake and immutable from then on; the only state
/// change a record undergoes is removal once its reply was delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutRecord {
    /// Where the reply must be sent.
    pub reply_to: Endpoint,

    /// The requester's correlation token, echoed verbatim in the reply.
    /// Opaque to the engine and not required to be unique.
    pub correlation_id: String,

    /// The absolute instant the reply becomes due. Computed once at intake
    /// as receipt time plus the requested delay, never recomputed.
    pub time_to_return: DateTime<Utc>,

    /// Payload captured from the request, if any.
    pub payload: Option<TimeoutPayload>,
}

impl TimeoutRecord {
    /// Builds a record from the intake fields.
    pub fn new(
        reply_to: Endpoint,
        correlation_id: impl Into<String>,
        time_to_return: DateTime<Utc>,
        payload: Option<TimeoutPayload>,
    ) -> Self {
        Self {
            reply_to,
            correlation_id: correlation_id.into(),
            time_to_return,
            payload,
        }
    }

    /// True once the due instant has been reached. A record due exactly
    /// `now` counts as due.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.time_to_return <= now
    }
}

impl fmt::Display for TimeoutRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {}",
            self.time_to_return, self.correlation_id, self.reply_to
        )
    }
}
