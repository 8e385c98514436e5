pub mod negotiation_tests;

use apprtc_client::negotiation::{NegotiationEngine, NegotiationEvent};
use apprtc_client::room::{IceApi, RoomApi};
use apprtc_client::session::{CallHandle, CallServices, CallSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Level;

use crate::utils::{MockPeerFactory, RecordingConnector, RecordingObserver};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_engine(
    peers: &MockPeerFactory,
) -> (NegotiationEngine, mpsc::UnboundedReceiver<NegotiationEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = NegotiationEngine::spawn(Arc::new(peers.clone()), tx);
    (engine, rx)
}

/// Next negotiation event, or `None` after `timeout_ms`.
pub async fn next_event(
    rx: &mut mpsc::UnboundedReceiver<NegotiationEvent>,
    timeout_ms: u64,
) -> Option<NegotiationEvent> {
    tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv())
        .await
        .ok()
        .flatten()
}

pub struct TestCall {
    pub handle: CallHandle,
    pub observer: RecordingObserver,
    pub task: JoinHandle<()>,
}

pub fn create_test_call(
    room: impl RoomApi + 'static,
    ice: impl IceApi + 'static,
    relay: &RecordingConnector,
    peers: &MockPeerFactory,
) -> TestCall {
    let services = CallServices {
        room: Arc::new(room),
        ice: Arc::new(ice),
        relay: Arc::new(relay.clone()),
        peers: Arc::new(peers.clone()),
        leave_timeout: Duration::from_millis(500),
    };
    let observer = RecordingObserver::new();
    let (session, handle) = CallSession::new(services, Arc::new(observer.clone()));
    let task = tokio::spawn(session.run());

    TestCall {
        handle,
        observer,
        task,
    }
}
