use crate::error::NegotiationError;
use crate::transport::PeerEvent;
use apprtc_core::{SdpKind, SessionDescription};

#[derive(Debug)]
pub enum NegotiationEvent {
    /// A local description was created and committed to the connection.
    LocalDescriptionReady(SessionDescription),
    /// The remote description was applied and early candidates flushed.
    RemoteDescriptionSet(SdpKind),
    Peer(PeerEvent),
    Failed(NegotiationError),
}
