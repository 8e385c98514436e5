pub mod config;
pub mod error;
pub mod negotiation;
pub mod room;
pub mod session;
pub mod signaling;
pub mod transport;

pub use error::{CallError, NegotiationError, NegotiationStep, TransportError};
