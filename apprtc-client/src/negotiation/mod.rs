mod engine_command;
mod engine_worker;
mod negotiation_engine;
mod negotiation_event;

pub use negotiation_engine::NegotiationEngine;
pub use negotiation_event::NegotiationEvent;
