use crate::negotiation::NegotiationEvent;
use crate::negotiation::engine_command::EngineCommand;
use crate::negotiation::engine_worker::EngineWorker;
use crate::transport::PeerConnectionFactory;
use apprtc_core::{IceCandidate, IceServer, ProtocolError, RelayEnvelope, SessionDescription, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Handle to the negotiation worker.
///
/// Every method returns immediately; the work runs on the worker task in
/// submission order and results come back as [`NegotiationEvent`]s. Remote
/// candidates submitted before the remote description are held back and
/// applied right after it, in arrival order.
pub struct NegotiationEngine {
    commands: mpsc::UnboundedSender<EngineCommand>,
}

impl NegotiationEngine {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(
        factory: Arc<dyn PeerConnectionFactory>,
        events: mpsc::UnboundedSender<NegotiationEvent>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(EngineWorker::new(factory, events, command_rx).run());
        Self { commands }
    }

    pub fn create_connection(&self, ice_servers: Vec<IceServer>) {
        self.submit(EngineCommand::CreateConnection { ice_servers });
    }

    pub fn create_offer(&self) {
        self.submit(EngineCommand::CreateOffer);
    }

    /// Requests the answer. Before a remote offer is applied this is a no-op,
    /// the answer is produced as soon as the offer lands.
    pub fn create_answer(&self) {
        self.submit(EngineCommand::CreateAnswer);
    }

    /// Applying a remote offer is always followed by answer creation.
    pub fn set_remote_description(&self, desc: SessionDescription) {
        self.submit(EngineCommand::SetRemoteDescription(desc));
    }

    pub fn add_remote_candidate(&self, candidate: IceCandidate) {
        self.submit(EngineCommand::AddRemoteCandidate(candidate));
    }

    /// Parses a relay frame `{msg: "<payload>"}` and dispatches the payload.
    /// An empty `msg` is ignored.
    pub fn handle_signaling_payload(&self, raw: &str) -> Result<(), ProtocolError> {
        let envelope = RelayEnvelope::from_json(raw)?;
        if let Some(err) = envelope.relay_error() {
            warn!("Relay reported error: {}", err);
        }

        let Some(message) = envelope.message() else {
            debug!("Ignoring empty relay message");
            return Ok(());
        };

        let payload = SignalPayload::from_json(message)?;
        self.handle_payload(payload);
        Ok(())
    }

    pub fn handle_payload(&self, payload: SignalPayload) {
        if let Some(candidate) = payload.ice_candidate() {
            self.add_remote_candidate(candidate);
        } else if let Some(desc) = payload.description() {
            self.set_remote_description(desc);
        } else {
            debug!("Remote sent bye");
        }
    }

    /// Closes the connection. Safe to call repeatedly or before
    /// `create_connection`.
    pub fn disconnect(&self) {
        self.submit(EngineCommand::Disconnect);
    }

    fn submit(&self, cmd: EngineCommand) {
        if let Err(e) = self.commands.send(cmd) {
            debug!("Negotiation worker gone, dropping {:?}", e.0);
        }
    }
}
