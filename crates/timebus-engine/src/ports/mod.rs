//! # Ports Layer
//!
//! The engine's interfaces to the outside world. Inbound ports are driven
//! by the transport; outbound ports are the dependencies the engine drives.

pub mod inbound;
pub mod outbound;

pub use inbound::{Dispatch, MessageHandler};
pub use outbound::{BusGateway, Clock, ManualClock, SystemClock, TimeoutStore};
