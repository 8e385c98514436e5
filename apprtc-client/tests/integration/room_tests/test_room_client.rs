use apprtc_client::TransportError;
use apprtc_client::config::ClientConfig;
use apprtc_client::room::{RoomApi, RoomClient};
use apprtc_core::SignalPayload;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::integration::init_tracing;
use crate::utils::{FakeRoomServer, RecordedRequest};

fn responder_params() -> serde_json::Value {
    let pc_config = json!({ "iceServers": [{ "urls": "stun:stun.test" }] });
    let messages = vec![
        json!({ "type": "offer", "sdp": "v=0 remote" }).to_string(),
        json!({ "type": "candidate", "label": 0, "id": "audio", "candidate": "candidate:1" })
            .to_string(),
        json!({ "type": "bye" }).to_string(),
        "{not json".to_string(),
        json!({ "type": "candidate", "label": 1, "id": "video", "candidate": "candidate:2" })
            .to_string(),
    ];

    // Encoded the way the room server does it: params and its parts as strings.
    json!({
        "room_id": "A",
        "client_id": "2002",
        "is_initiator": "false",
        "wss_url": "wss://relay.test/ws",
        "wss_post_url": "https://relay.test",
        "pc_config": pc_config.to_string(),
        "messages": messages,
        "ice_server_url": "https://ice.test/v1alpha/iceconfig?key=k",
    })
}

async fn client_for(server: &FakeRoomServer) -> RoomClient {
    let base = server.clone().spawn().await;
    RoomClient::new(reqwest::Client::new(), Url::parse(&base).unwrap())
}

#[tokio::test]
async fn test_join_parses_room_parameters_and_bundle() {
    init_tracing();

    let server = FakeRoomServer::new(responder_params(), json!({}));
    let client = client_for(&server).await;

    let join = client.join("A").await.expect("join should succeed");

    assert!(!join.is_initiator());
    assert_eq!(join.params.room_id, "A");
    assert_eq!(join.params.client_id, "2002");
    assert_eq!(join.params.wss_url, "wss://relay.test/ws");
    assert_eq!(join.params.pc_config.ice_servers[0].urls, vec!["stun:stun.test".to_string()]);
    assert_eq!(join.params.ice_resolver_base(), Some("https://ice.test/v1alpha/"));

    assert_eq!(
        join.messages,
        vec![
            SignalPayload::Offer {
                sdp: "v=0 remote".into()
            },
            SignalPayload::Candidate {
                sdp_m_line_index: 0,
                sdp_mid: "audio".into(),
                candidate: "candidate:1".into(),
            },
            SignalPayload::Candidate {
                sdp_m_line_index: 1,
                sdp_mid: "video".into(),
                candidate: "candidate:2".into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_initiator_ignores_bundle() {
    init_tracing();

    let mut params = responder_params();
    params["is_initiator"] = json!(true);
    let server = FakeRoomServer::new(params, json!({}));
    let client = client_for(&server).await;

    let join = client.join("A").await.expect("join should succeed");
    assert!(join.is_initiator());
    assert!(join.messages.is_empty());
}

#[tokio::test]
async fn test_join_failures_surface() {
    init_tracing();

    let server = FakeRoomServer::new(responder_params(), json!({}));
    let client = client_for(&server).await;

    match client.join("full").await {
        Err(TransportError::Rejected(result)) => assert_eq!(result, "FULL"),
        other => panic!("Expected Rejected, got {:?}", other.map(|j| j.params.room_id)),
    }
    match client.join("broken").await {
        Err(TransportError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("Expected Status, got {:?}", other.map(|j| j.params.room_id)),
    }

    // Not retried.
    assert_eq!(server.requests().await.len(), 2);
}

#[tokio::test]
async fn test_message_leave_and_delete_routes() {
    init_tracing();

    let server = FakeRoomServer::new(responder_params(), json!({}));
    let client = client_for(&server).await;
    let payload = json!({ "type": "offer", "sdp": "v=0 local" }).to_string();

    client.post_message("room one", "1001", &payload).await.unwrap();
    client.leave("room one", "1001").await.unwrap();
    client.delete("room one", "1001").await.unwrap();

    assert_eq!(
        server.requests().await,
        vec![
            RecordedRequest {
                route: "message".into(),
                room: "room one".into(),
                client: Some("1001".into()),
                body: payload,
            },
            RecordedRequest {
                route: "leave".into(),
                room: "room one".into(),
                client: Some("1001".into()),
                body: String::new(),
            },
            RecordedRequest {
                route: "delete".into(),
                room: "room one".into(),
                client: Some("1001".into()),
                body: String::new(),
            },
        ]
    );
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    init_tracing();

    let client = RoomClient::new(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/").unwrap(),
    );
    assert!(matches!(client.join("A").await, Err(TransportError::Http(_))));
}

#[tokio::test]
async fn test_request_timeout_bounds_stalled_leave() {
    init_tracing();

    let server = FakeRoomServer::new(responder_params(), json!({}));
    let base = server.clone().spawn().await;
    let config = ClientConfig::new(&base)
        .unwrap()
        .with_connect_timeout(Duration::from_secs(1))
        .with_request_timeout(Duration::from_millis(300));
    let client = RoomClient::new(config.http_client().unwrap(), config.room_server_url.clone());

    let result = tokio::time::timeout(Duration::from_secs(3), client.leave("stalled", "1001"))
        .await
        .expect("leave should be bounded by the request timeout");
    match result {
        Err(TransportError::Http(e)) => assert!(e.is_timeout(), "unexpected error: {}", e),
        other => panic!("Expected a timed out request, got {:?}", other),
    }

    assert_eq!(server.requests().await.len(), 1);
}
