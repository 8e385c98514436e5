mod ice_resolver;
mod room_api;
mod room_client;

pub use ice_resolver::*;
pub use room_api::*;
pub use room_client::*;
