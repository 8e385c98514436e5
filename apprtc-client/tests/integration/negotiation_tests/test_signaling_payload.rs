use apprtc_client::negotiation::NegotiationEvent;
use apprtc_core::{ProtocolError, SdpKind};
use serde_json::json;
use std::time::Duration;

use crate::integration::{create_test_engine, init_tracing, next_event};
use crate::utils::{MockPeerFactory, PeerOp};

fn wrap(payload: serde_json::Value) -> String {
    json!({ "msg": payload.to_string(), "error": "" }).to_string()
}

#[tokio::test]
async fn test_relay_payloads_are_dispatched() {
    init_tracing();

    let peers = MockPeerFactory::new();
    let (engine, mut events) = create_test_engine(&peers);
    engine.create_connection(Vec::new());

    engine
        .handle_signaling_payload(&wrap(json!({
            "type": "candidate", "label": 0, "id": "0", "candidate": "candidate:relay"
        })))
        .unwrap();
    engine
        .handle_signaling_payload(&wrap(json!({ "type": "answer", "sdp": "v=0 remote" })))
        .unwrap();

    match next_event(&mut events, 1000).await {
        Some(NegotiationEvent::RemoteDescriptionSet(kind)) => assert_eq!(kind, SdpKind::Answer),
        other => panic!("Expected RemoteDescriptionSet, got {:?}", other),
    }

    let applied = peers
        .wait_for_op(PeerOp::AddCandidate("candidate:relay".into()), 1, 1000)
        .await;
    assert!(applied);
}

#[tokio::test]
async fn test_empty_and_bye_payloads_are_ignored() {
    init_tracing();

    let peers = MockPeerFactory::new();
    let (engine, _events) = create_test_engine(&peers);
    engine.create_connection(Vec::new());

    assert!(engine.handle_signaling_payload(r#"{"msg":""}"#).is_ok());
    assert!(engine
        .handle_signaling_payload(r#"{"msg":"","error":"Unknown client"}"#)
        .is_ok());
    assert!(engine.handle_signaling_payload(&wrap(json!({ "type": "bye" }))).is_ok());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(peers.negotiation_ops().await.is_empty());
}

#[tokio::test]
async fn test_malformed_payloads_are_rejected() {
    init_tracing();

    let peers = MockPeerFactory::new();
    let (engine, _events) = create_test_engine(&peers);

    assert!(matches!(
        engine.handle_signaling_payload("not json"),
        Err(ProtocolError::Json(_))
    ));
    assert!(matches!(
        engine.handle_signaling_payload(r#"{"error":"x"}"#),
        Err(ProtocolError::MissingField("msg"))
    ));
    assert!(matches!(
        engine.handle_signaling_payload(&wrap(json!({ "type": "renegotiate" }))),
        Err(ProtocolError::UnknownType(t)) if t == "renegotiate"
    ));
    assert!(matches!(
        engine.handle_signaling_payload(&wrap(json!({ "type": "candidate", "id": "0" }))),
        Err(ProtocolError::MissingField(_))
    ));
}
