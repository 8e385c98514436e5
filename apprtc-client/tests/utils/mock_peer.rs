use crate::utils::wait_until;
use anyhow::{Result, bail};
use apprtc_client::transport::{MediaKind, PeerConnection, PeerConnectionFactory, PeerEvent};
use apprtc_core::{IceCandidate, IceServer, SdpKind, SessionDescription};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

pub const MOCK_OFFER_SDP: &str = "v=0 mock-offer";
pub const MOCK_ANSWER_SDP: &str = "v=0 mock-answer";

/// Every call made on a mock connection, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerOp {
    Create { ice_urls: Vec<String> },
    AddTrack(MediaKind),
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpKind),
    SetRemote(SdpKind),
    AddCandidate(String),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    AddTrack(MediaKind),
    CreateOffer,
    SetLocal,
    SetRemote,
}

#[derive(Default)]
struct Shared {
    ops: Mutex<Vec<PeerOp>>,
    events: Mutex<Option<mpsc::UnboundedSender<PeerEvent>>>,
}

/// Peer connection factory that records operations instead of doing media.
#[derive(Clone, Default)]
pub struct MockPeerFactory {
    shared: Arc<Shared>,
    fail: Option<FailPoint>,
    delay: Option<Duration>,
}

impl MockPeerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(point: FailPoint) -> Self {
        Self {
            fail: Some(point),
            ..Self::default()
        }
    }

    /// Makes every async step take `delay`, so commands pile up behind it.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn ops(&self) -> Vec<PeerOp> {
        self.shared.ops.lock().await.clone()
    }

    /// Operations after connection setup (creation and track additions).
    pub async fn negotiation_ops(&self) -> Vec<PeerOp> {
        self.ops()
            .await
            .into_iter()
            .filter(|op| !matches!(op, PeerOp::Create { .. } | PeerOp::AddTrack(_)))
            .collect()
    }

    pub async fn count(&self, op: &PeerOp) -> usize {
        self.shared.ops.lock().await.iter().filter(|o| *o == op).count()
    }

    pub async fn wait_for_negotiation_ops(&self, len: usize, timeout_ms: u64) -> bool {
        wait_until(timeout_ms, || async move { self.negotiation_ops().await.len() >= len }).await
    }

    pub async fn wait_for_op(&self, op: PeerOp, times: usize, timeout_ms: u64) -> bool {
        let op = &op;
        wait_until(timeout_ms, || async move { self.count(op).await >= times }).await
    }

    /// Fires an engine callback as if the real engine produced it.
    pub async fn emit(&self, event: PeerEvent) -> bool {
        match self.shared.events.lock().await.as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub async fn emit_candidate(&self, candidate: &str) -> bool {
        self.emit(PeerEvent::CandidateGenerated(IceCandidate::new("0", 0, candidate)))
            .await
    }
}

#[async_trait]
impl PeerConnectionFactory for MockPeerFactory {
    async fn create(
        &self,
        ice_servers: &[IceServer],
        events: mpsc::UnboundedSender<PeerEvent>,
    ) -> Result<Box<dyn PeerConnection>> {
        let ice_urls = ice_servers.iter().flat_map(|s| s.urls.clone()).collect();
        self.shared.ops.lock().await.push(PeerOp::Create { ice_urls });
        *self.shared.events.lock().await = Some(events);

        Ok(Box::new(MockPeerConnection {
            shared: self.shared.clone(),
            fail: self.fail,
            delay: self.delay,
        }))
    }
}

struct MockPeerConnection {
    shared: Arc<Shared>,
    fail: Option<FailPoint>,
    delay: Option<Duration>,
}

impl MockPeerConnection {
    async fn record(&self, op: PeerOp) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.shared.ops.lock().await.push(op);
    }
}

#[async_trait]
impl PeerConnection for MockPeerConnection {
    async fn add_local_track(&self, kind: MediaKind) -> Result<()> {
        self.record(PeerOp::AddTrack(kind)).await;
        if self.fail == Some(FailPoint::AddTrack(kind)) {
            bail!("{:?} track rejected", kind);
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        self.record(PeerOp::CreateOffer).await;
        if self.fail == Some(FailPoint::CreateOffer) {
            bail!("offer rejected");
        }
        Ok(SessionDescription::offer(MOCK_OFFER_SDP))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        self.record(PeerOp::CreateAnswer).await;
        Ok(SessionDescription::answer(MOCK_ANSWER_SDP))
    }

    async fn set_local_description(&self, desc: &SessionDescription) -> Result<()> {
        self.record(PeerOp::SetLocal(desc.kind)).await;
        if self.fail == Some(FailPoint::SetLocal) {
            bail!("local description rejected");
        }
        Ok(())
    }

    async fn set_remote_description(&self, desc: &SessionDescription) -> Result<()> {
        self.record(PeerOp::SetRemote(desc.kind)).await;
        if self.fail == Some(FailPoint::SetRemote) {
            bail!("remote description rejected");
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: &IceCandidate) -> Result<()> {
        self.record(PeerOp::AddCandidate(candidate.candidate.clone()))
            .await;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(PeerOp::Close).await;
        Ok(())
    }
}
