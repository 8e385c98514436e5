use apprtc_core::IceCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// Callbacks of the peer connection engine, delivered as messages so that
/// nothing is mutated from the engine's own threads.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    /// A local candidate was gathered and should reach the remote peer.
    CandidateGenerated(IceCandidate),
    StateChanged(PeerState),
    RemoteTrack(MediaKind),
}
