//! Connection to the external audio engine.
pub mod client;
pub mod error;
pub mod link;
pub mod projector;
pub mod protocol;

pub use client::{ClientSettings, CommandTicket, EngineClient, InboundMessage, PendingPolicy};
pub use error::{ClientError, ProtocolError};
pub use projector::StateProjector;
