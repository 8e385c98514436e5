pub use apprtc_core::{IceCandidate, IceServer, SdpKind, SessionDescription, SignalPayload};

pub mod model {
    pub use apprtc_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use apprtc_client::*;
}
