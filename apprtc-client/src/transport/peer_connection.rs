use crate::transport::{MediaKind, PeerEvent};
use anyhow::Result;
use apprtc_core::{IceCandidate, IceServer, SessionDescription};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// The media engine: SDP generation, tracks and ICE gathering.
///
/// Implementations must not be driven concurrently; the negotiation engine
/// guarantees that every call below happens from one task, one at a time.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn add_local_track(&self, kind: MediaKind) -> Result<()>;

    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: &SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: &SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait PeerConnectionFactory: Send + Sync {
    /// Creates a connection for `ice_servers`. Engine callbacks are reported
    /// through `events` for the lifetime of the connection.
    async fn create(
        &self,
        ice_servers: &[IceServer],
        events: mpsc::UnboundedSender<PeerEvent>,
    ) -> Result<Box<dyn PeerConnection>>;
}
