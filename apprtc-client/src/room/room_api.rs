use crate::error::TransportError;
use apprtc_core::{IceServer, RoomParams, SignalPayload};
use async_trait::async_trait;

/// Everything the room server hands a participant on a successful join.
#[derive(Debug, Clone)]
pub struct RoomJoinResult {
    pub params: RoomParams,
    /// Payloads the initiator posted before this client arrived, in the
    /// order the room server stored them. Always empty for the initiator.
    pub messages: Vec<SignalPayload>,
}

impl RoomJoinResult {
    pub fn is_initiator(&self) -> bool {
        self.params.is_initiator
    }
}

/// Request/response access to the room-matching service.
///
/// Every call is a single attempt; callers decide whether to retry.
#[async_trait]
pub trait RoomApi: Send + Sync {
    async fn join(&self, room_id: &str) -> Result<RoomJoinResult, TransportError>;

    async fn post_message(
        &self,
        room_id: &str,
        client_id: &str,
        payload: &str,
    ) -> Result<(), TransportError>;

    async fn leave(&self, room_id: &str, client_id: &str) -> Result<(), TransportError>;

    async fn delete(&self, room_id: &str, client_id: &str) -> Result<(), TransportError>;
}

/// Fetches relay credentials when the room supplied none.
#[async_trait]
pub trait IceApi: Send + Sync {
    async fn fetch(&self, base_url: &str) -> Result<Vec<IceServer>, TransportError>;
}
