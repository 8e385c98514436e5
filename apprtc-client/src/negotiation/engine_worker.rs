use crate::error::{NegotiationError, NegotiationStep};
use crate::negotiation::NegotiationEvent;
use crate::negotiation::engine_command::EngineCommand;
use crate::transport::{MediaKind, PeerConnection, PeerConnectionFactory};
use apprtc_core::{IceCandidate, IceServer, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Owns the peer connection. Commands are processed strictly one at a time,
/// so the connection is never mutated concurrently.
pub(crate) struct EngineWorker {
    factory: Arc<dyn PeerConnectionFactory>,
    events: mpsc::UnboundedSender<NegotiationEvent>,
    command_rx: mpsc::UnboundedReceiver<EngineCommand>,
    connection: Option<Box<dyn PeerConnection>>,
    remote_kind: Option<SdpKind>,
    early_candidates: Vec<IceCandidate>,
    local_created: bool,
    closed: bool,
}

impl EngineWorker {
    pub(crate) fn new(
        factory: Arc<dyn PeerConnectionFactory>,
        events: mpsc::UnboundedSender<NegotiationEvent>,
        command_rx: mpsc::UnboundedReceiver<EngineCommand>,
    ) -> Self {
        Self {
            factory,
            events,
            command_rx,
            connection: None,
            remote_kind: None,
            early_candidates: Vec::new(),
            local_created: false,
            closed: false,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!("Negotiation worker started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        self.close_connection().await;
        debug!("Negotiation worker finished");
    }

    async fn handle_command(&mut self, cmd: EngineCommand) {
        if self.closed {
            debug!("Ignoring {:?} after disconnect", cmd);
            return;
        }

        match cmd {
            EngineCommand::CreateConnection { ice_servers } => {
                self.create_connection(ice_servers).await;
            }
            EngineCommand::CreateOffer => {
                self.create_local(SdpKind::Offer).await;
            }
            EngineCommand::CreateAnswer => {
                if self.remote_kind != Some(SdpKind::Offer) {
                    debug!("Answer requested before a remote offer; it follows the offer");
                    return;
                }
                self.create_local(SdpKind::Answer).await;
            }
            EngineCommand::SetRemoteDescription(desc) => {
                self.set_remote(desc).await;
            }
            EngineCommand::AddRemoteCandidate(candidate) => {
                if self.remote_kind.is_none() {
                    debug!("Buffering remote candidate until remote description is set");
                    self.early_candidates.push(candidate);
                    return;
                }
                self.apply_candidate(&candidate).await;
            }
            EngineCommand::Disconnect => {
                self.close_connection().await;
            }
        }
    }

    async fn create_connection(&mut self, ice_servers: Vec<IceServer>) {
        if self.connection.is_some() {
            warn!("Peer connection already exists");
            return;
        }

        info!("Creating peer connection with {} ICE servers", ice_servers.len());

        let (peer_tx, mut peer_rx) = mpsc::unbounded_channel();
        let connection = match self.factory.create(&ice_servers, peer_tx).await {
            Ok(c) => c,
            Err(e) => {
                self.fail(NegotiationStep::CreateConnection, e);
                return;
            }
        };

        let events = self.events.clone();
        tokio::spawn(async move {
            while let Some(event) = peer_rx.recv().await {
                if events.send(NegotiationEvent::Peer(event)).is_err() {
                    break;
                }
            }
        });

        for kind in [MediaKind::Audio, MediaKind::Video] {
            if let Err(e) = connection.add_local_track(kind).await {
                let e = e.context(format!("add {:?} track", kind));
                self.fail(NegotiationStep::CreateConnection, e);
                if let Err(e) = connection.close().await {
                    warn!("Failed to close half-built peer connection: {:?}", e);
                }
                return;
            }
        }

        self.connection = Some(connection);
    }

    /// Creates the description, commits it, and only then reports it.
    async fn create_local(&mut self, kind: SdpKind) {
        if self.local_created {
            debug!("Local description already created; ignoring {} request", kind);
            return;
        }
        if self.connection.is_none() {
            warn!("No peer connection; cannot create {}", kind);
            return;
        }
        self.local_created = true;
        let Some(connection) = &self.connection else {
            return;
        };

        let (create_step, created) = match kind {
            SdpKind::Offer => (NegotiationStep::CreateOffer, connection.create_offer().await),
            SdpKind::Answer => (NegotiationStep::CreateAnswer, connection.create_answer().await),
        };
        let desc = match created {
            Ok(desc) => desc,
            Err(e) => {
                self.fail(create_step, e);
                return;
            }
        };

        if let Err(e) = connection.set_local_description(&desc).await {
            self.fail(NegotiationStep::SetLocalDescription, e);
            return;
        }

        info!("Local {} committed", desc.kind);
        let _ = self.events.send(NegotiationEvent::LocalDescriptionReady(desc));
    }

    async fn set_remote(&mut self, desc: SessionDescription) {
        if let Some(existing) = self.remote_kind {
            warn!("Remote {} already set; ignoring remote {}", existing, desc.kind);
            return;
        }
        let Some(connection) = &self.connection else {
            warn!("No peer connection; dropping remote {}", desc.kind);
            return;
        };

        if let Err(e) = connection.set_remote_description(&desc).await {
            self.fail(NegotiationStep::SetRemoteDescription, e);
            return;
        }
        self.remote_kind = Some(desc.kind);
        info!("Remote {} applied", desc.kind);

        let early = std::mem::take(&mut self.early_candidates);
        if !early.is_empty() {
            debug!("Applying {} buffered remote candidates", early.len());
        }
        for candidate in &early {
            self.apply_candidate(candidate).await;
        }

        let _ = self
            .events
            .send(NegotiationEvent::RemoteDescriptionSet(desc.kind));

        if desc.kind == SdpKind::Offer {
            self.create_local(SdpKind::Answer).await;
        }
    }

    async fn apply_candidate(&self, candidate: &IceCandidate) {
        let Some(connection) = &self.connection else {
            warn!("No peer connection; dropping remote candidate");
            return;
        };
        if let Err(e) = connection.add_ice_candidate(candidate).await {
            self.fail(NegotiationStep::AddIceCandidate, e);
        }
    }

    async fn close_connection(&mut self) {
        self.closed = true;
        self.early_candidates.clear();

        let Some(connection) = self.connection.take() else {
            return;
        };
        info!("Closing peer connection");
        if let Err(e) = connection.close().await {
            warn!("Failed to close peer connection: {:?}", e);
        }
    }

    fn fail(&self, step: NegotiationStep, err: anyhow::Error) {
        let failure = NegotiationError::new(step, format!("{:#}", err));
        error!("{}", failure);
        let _ = self.events.send(NegotiationEvent::Failed(failure));
    }
}
