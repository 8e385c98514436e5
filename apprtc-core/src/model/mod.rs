mod ice_candidate;
mod ice_server;
mod relay;
mod room;
mod session_description;
mod signaling;

pub use ice_candidate::IceCandidate;
pub use ice_server::IceServer;
pub use relay::{RelayCommand, RelayEnvelope};
pub use room::{IceConfigResponse, JOIN_SUCCESS, JoinResponse, PcConfig, RoomParams, decode_embedded};
pub use session_description::{SdpKind, SessionDescription};
pub use signaling::SignalPayload;
