use apprtc_client::negotiation::NegotiationEvent;
use apprtc_core::{IceCandidate, SdpKind, SessionDescription};
use std::time::Duration;

use crate::integration::{create_test_engine, init_tracing, next_event};
use crate::utils::{MockPeerFactory, PeerOp};

#[tokio::test]
async fn test_early_candidates_follow_remote_description() {
    init_tracing();

    let peers = MockPeerFactory::new().with_delay(Duration::from_millis(5));
    let (engine, mut events) = create_test_engine(&peers);

    engine.create_connection(Vec::new());
    engine.add_remote_candidate(IceCandidate::new("0", 0, "candidate:first"));
    engine.add_remote_candidate(IceCandidate::new("0", 0, "candidate:second"));
    engine.set_remote_description(SessionDescription::answer("v=0 remote"));
    engine.add_remote_candidate(IceCandidate::new("0", 0, "candidate:third"));

    match next_event(&mut events, 2000).await {
        Some(NegotiationEvent::RemoteDescriptionSet(kind)) => assert_eq!(kind, SdpKind::Answer),
        other => panic!("Expected RemoteDescriptionSet, got {:?}", other),
    }

    let settled = peers.wait_for_negotiation_ops(4, 2000).await;
    assert!(settled, "Expected remote description and three candidates");

    assert_eq!(
        peers.negotiation_ops().await,
        vec![
            PeerOp::SetRemote(SdpKind::Answer),
            PeerOp::AddCandidate("candidate:first".into()),
            PeerOp::AddCandidate("candidate:second".into()),
            PeerOp::AddCandidate("candidate:third".into()),
        ]
    );
}

#[tokio::test]
async fn test_remote_offer_applies_candidates_before_answer() {
    init_tracing();

    let peers = MockPeerFactory::new();
    let (engine, mut events) = create_test_engine(&peers);

    engine.create_connection(Vec::new());
    engine.add_remote_candidate(IceCandidate::new("audio", 0, "candidate:a"));
    engine.add_remote_candidate(IceCandidate::new("video", 1, "candidate:b"));
    engine.set_remote_description(SessionDescription::offer("v=0 remote"));
    engine.create_answer();

    let mut answers = 0;
    while let Some(event) = next_event(&mut events, 300).await {
        if let NegotiationEvent::LocalDescriptionReady(desc) = event {
            assert_eq!(desc.kind, SdpKind::Answer);
            answers += 1;
        }
    }
    assert_eq!(answers, 1, "Exactly one answer must be reported");

    assert_eq!(
        peers.negotiation_ops().await,
        vec![
            PeerOp::SetRemote(SdpKind::Offer),
            PeerOp::AddCandidate("candidate:a".into()),
            PeerOp::AddCandidate("candidate:b".into()),
            PeerOp::CreateAnswer,
            PeerOp::SetLocal(SdpKind::Answer),
        ]
    );
}

#[tokio::test]
async fn test_second_remote_description_is_ignored() {
    init_tracing();

    let peers = MockPeerFactory::new();
    let (engine, mut events) = create_test_engine(&peers);

    engine.create_connection(Vec::new());
    engine.set_remote_description(SessionDescription::answer("v=0 one"));
    engine.set_remote_description(SessionDescription::answer("v=0 two"));

    let mut applied = 0;
    while let Some(event) = next_event(&mut events, 300).await {
        if matches!(event, NegotiationEvent::RemoteDescriptionSet(_)) {
            applied += 1;
        }
    }

    assert_eq!(applied, 1);
    assert_eq!(peers.count(&PeerOp::SetRemote(SdpKind::Answer)).await, 1);
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    init_tracing();

    let peers = MockPeerFactory::new();
    let (engine, _events) = create_test_engine(&peers);

    // Nothing to close yet.
    engine.disconnect();
    engine.disconnect();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(peers.ops().await.is_empty());

    let peers = MockPeerFactory::new();
    let (engine, _events) = create_test_engine(&peers);

    engine.create_connection(Vec::new());
    engine.disconnect();
    engine.disconnect();
    engine.create_offer();

    let closed = peers.wait_for_op(PeerOp::Close, 1, 1000).await;
    assert!(closed, "Connection should be closed once");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(peers.count(&PeerOp::Close).await, 1);
    assert_eq!(peers.count(&PeerOp::CreateOffer).await, 0);
}
