mod peer_connection;
mod peer_event;
mod rtc_connection;

pub use peer_connection::*;
pub use peer_event::*;
pub use rtc_connection::*;
