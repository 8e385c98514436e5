use crate::room::RoomJoinResult;
use apprtc_core::{IceCandidate, IceServer, SessionDescription, SignalPayload};
use tracing::warn;

/// What the room server told us about this call.
///
/// Only the ICE server list changes after creation, and it can be extended
/// at most once.
#[derive(Debug, Clone)]
pub struct RoomSession {
    pub room_id: String,
    pub client_id: String,
    pub is_initiator: bool,
    pub relay_url: String,
    pub relay_post_url: String,
    ice_servers: Vec<IceServer>,
    ice_resolver_base: Option<String>,
    ice_servers_extended: bool,
    pending_remote_offer: Option<SessionDescription>,
    pending_remote_candidates: Vec<IceCandidate>,
}

impl RoomSession {
    pub fn from_join(join: RoomJoinResult) -> Self {
        let params = join.params;

        let mut pending_remote_offer = None;
        let mut pending_remote_candidates = Vec::new();
        for payload in join.messages {
            match payload {
                SignalPayload::Candidate { .. } => {
                    pending_remote_candidates.extend(payload.ice_candidate());
                }
                SignalPayload::Offer { .. } if pending_remote_offer.is_none() => {
                    pending_remote_offer = payload.description();
                }
                other => warn!("Ignoring buffered room message {:?}", other),
            }
        }

        Self {
            ice_resolver_base: params.ice_resolver_base().map(str::to_owned),
            room_id: params.room_id,
            client_id: params.client_id,
            is_initiator: params.is_initiator,
            relay_url: params.wss_url,
            relay_post_url: params.wss_post_url,
            ice_servers: params.pc_config.ice_servers,
            ice_servers_extended: false,
            pending_remote_offer,
            pending_remote_candidates,
        }
    }

    pub fn ice_servers(&self) -> &[IceServer] {
        &self.ice_servers
    }

    pub fn has_relay_server(&self) -> bool {
        self.ice_servers.iter().any(IceServer::is_relay)
    }

    /// The credential service to ask, if the room gave us no TURN server.
    pub fn ice_resolver_base(&self) -> Option<&str> {
        if self.has_relay_server() {
            return None;
        }
        self.ice_resolver_base.as_deref()
    }

    /// Appends resolved servers to the room-provided ones. Returns `false`
    /// if the list was already extended.
    pub fn extend_ice_servers(&mut self, servers: Vec<IceServer>) -> bool {
        if self.ice_servers_extended {
            return false;
        }
        self.ice_servers_extended = true;
        self.ice_servers.extend(servers);
        true
    }

    pub fn take_pending_offer(&mut self) -> Option<SessionDescription> {
        self.pending_remote_offer.take()
    }

    pub fn take_pending_candidates(&mut self) -> Vec<IceCandidate> {
        std::mem::take(&mut self.pending_remote_candidates)
    }
}
