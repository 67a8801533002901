//! # Timebus Message Contracts
//!
//! This crate contains the wire contracts shared between requesters and the
//! timeout service: the request/reply message pair, the polymorphic payload
//! carrier, and the transport envelope types.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Both sides of the protocol depend on this
//!   crate; the service never re-declares requester types.
//! - **Construction Over Inspection**: Whether a request carries payload data
//!   is decided by the constructor the requester calls, never discovered by
//!   probing the message afterwards.
//! - **Explicit Addressing**: The return address travels on the envelope;
//!   nothing reads it from ambient context.

pub mod contracts;
pub mod envelope;

pub use contracts::{ContractError, TimeoutData, TimeoutPayload, TimeoutReply, TimeoutRequest};
pub use envelope::{Endpoint, MessageBody, TransportEnvelope};
