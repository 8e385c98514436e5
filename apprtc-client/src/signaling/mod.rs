mod relay_connector;
mod signaling_channel;
mod signaling_state;
mod ws_connector;

pub use relay_connector::*;
pub use signaling_channel::*;
pub use signaling_state::*;
pub use ws_connector::*;
