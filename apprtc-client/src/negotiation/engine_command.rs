use apprtc_core::{IceCandidate, IceServer, SessionDescription};

/// Work items for the engine's serial execution context.
#[derive(Debug)]
pub(crate) enum EngineCommand {
    CreateConnection { ice_servers: Vec<IceServer> },
    CreateOffer,
    CreateAnswer,
    SetRemoteDescription(SessionDescription),
    AddRemoteCandidate(IceCandidate),
    Disconnect,
}
