use crate::error::TransportError;
use crate::room::{RoomApi, RoomJoinResult};
use apprtc_core::{JoinResponse, ProtocolError, RoomParams, SignalPayload, decode_embedded};
use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::{debug, info, warn};
use url::Url;

/// HTTP client for the room server (`/join`, `/message`, `/leave`).
#[derive(Clone)]
pub struct RoomClient {
    http: Client,
    base_url: Url,
}

impl RoomClient {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
    ) -> Result<String, TransportError> {
        debug!("{} {}", method, url);

        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Acks are `{"result":"SUCCESS"}`; anything else that carries a result is a refusal.
fn check_ack(body: &str) -> Result<(), TransportError> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("result").and_then(|r| r.as_str()) {
            Some(result) if result != apprtc_core::JOIN_SUCCESS => {
                Err(TransportError::Rejected(result.to_owned()))
            }
            _ => Ok(()),
        },
        Err(_) => Ok(()),
    }
}

fn buffered_messages(params: &RoomParams) -> Vec<SignalPayload> {
    if params.is_initiator {
        return Vec::new();
    }

    let mut messages = Vec::with_capacity(params.messages.len());
    for raw in &params.messages {
        let payload = decode_embedded::<serde_json::Value>(raw.clone())
            .map_err(ProtocolError::from)
            .and_then(SignalPayload::from_value);

        match payload {
            Ok(payload @ (SignalPayload::Offer { .. } | SignalPayload::Candidate { .. })) => {
                messages.push(payload)
            }
            Ok(other) => debug!("Skipping buffered {:?} message", other),
            Err(e) => warn!("Dropping malformed buffered message {}: {}", raw, e),
        }
    }
    messages
}

#[async_trait]
impl RoomApi for RoomClient {
    async fn join(&self, room_id: &str) -> Result<RoomJoinResult, TransportError> {
        let url = self.endpoint(&["join", room_id])?;
        let body = self.request(Method::POST, url, None).await?;

        let response = JoinResponse::from_json(&body)?;
        if !response.is_success() {
            return Err(TransportError::Rejected(response.result));
        }

        let params = response.params()?;
        let messages = buffered_messages(&params);
        info!(
            "Joined room {} as client {} (initiator: {}, {} buffered messages)",
            params.room_id,
            params.client_id,
            params.is_initiator,
            messages.len()
        );

        Ok(RoomJoinResult { params, messages })
    }

    async fn post_message(
        &self,
        room_id: &str,
        client_id: &str,
        payload: &str,
    ) -> Result<(), TransportError> {
        let url = self.endpoint(&["message", room_id, client_id])?;
        let body = self
            .request(Method::POST, url, Some(payload.to_owned()))
            .await?;
        check_ack(&body)
    }

    async fn leave(&self, room_id: &str, client_id: &str) -> Result<(), TransportError> {
        let url = self.endpoint(&["leave", room_id, client_id])?;
        let body = self.request(Method::POST, url, None).await?;
        check_ack(&body)
    }

    async fn delete(&self, room_id: &str, client_id: &str) -> Result<(), TransportError> {
        let url = self.endpoint(&[room_id, client_id])?;
        let body = self.request(Method::DELETE, url, None).await?;
        check_ack(&body)
    }
}
