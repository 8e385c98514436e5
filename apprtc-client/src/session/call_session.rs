use crate::config::ClientConfig;
use crate::error::{CallError, TransportError};
use crate::negotiation::{NegotiationEngine, NegotiationEvent};
use crate::room::{IceApi, IceResolver, RoomApi, RoomClient, RoomJoinResult};
use crate::session::call_command::CallCommand;
use crate::session::session_event::SessionEvent;
use crate::session::{CallObserver, CallState, RoomSession, RoomState};
use crate::signaling::{RelayConnector, RelayEvent, SignalingChannel, SignalingState, WsConnector};
use crate::transport::{PeerConnectionFactory, PeerEvent, PeerState};
use apprtc_core::{IceCandidate, IceServer, SessionDescription, SignalPayload};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// External collaborators of a call session.
#[derive(Clone)]
pub struct CallServices {
    pub room: Arc<dyn RoomApi>,
    pub ice: Arc<dyn IceApi>,
    pub relay: Arc<dyn RelayConnector>,
    pub peers: Arc<dyn PeerConnectionFactory>,
    /// How long teardown waits for the room server to acknowledge `leave`.
    pub leave_timeout: Duration,
}

impl CallServices {
    /// Room client and ICE resolver over one HTTP client, relay over websockets.
    pub fn new(
        config: &ClientConfig,
        peers: Arc<dyn PeerConnectionFactory>,
    ) -> Result<Self, TransportError> {
        let http = config.http_client()?;

        Ok(Self {
            room: Arc::new(RoomClient::new(http.clone(), config.room_server_url.clone())),
            ice: Arc::new(IceResolver::new(http)),
            relay: Arc::new(WsConnector::new(config.connect_timeout)),
            peers,
            leave_timeout: config.request_timeout,
        })
    }
}

/// Sends commands to a running [`CallSession`]. Dropping every handle hangs
/// up and stops the session.
#[derive(Clone)]
pub struct CallHandle {
    commands: mpsc::Sender<CallCommand>,
}

impl CallHandle {
    pub async fn join(&self, room_id: impl Into<String>) {
        self.submit(CallCommand::Join {
            room_id: room_id.into(),
        })
        .await;
    }

    pub async fn hangup(&self) {
        self.submit(CallCommand::Hangup).await;
    }

    async fn submit(&self, cmd: CallCommand) {
        if let Err(e) = self.commands.send(cmd).await {
            warn!("Call session is gone, dropping {:?}", e.0);
        }
    }
}

/// One call: room join, ICE servers, relay, negotiation.
///
/// Every piece of session state is owned by the `run` task. Network work is
/// spawned and reports back as events, so completions that arrive after the
/// call ended are simply dropped.
pub struct CallSession {
    services: CallServices,
    observer: Arc<dyn CallObserver>,
    state: CallState,
    room_state: RoomState,
    room: Option<RoomSession>,
    room_outbox: Option<RoomOutbox>,
    channel: SignalingChannel,
    engine: NegotiationEngine,
    local_sent: bool,
    remote_set: bool,
    command_rx: mpsc::Receiver<CallCommand>,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
    session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    negotiation_rx: mpsc::UnboundedReceiver<NegotiationEvent>,
    relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
}

impl CallSession {
    /// Must be called inside a tokio runtime: the negotiation worker is
    /// spawned right away.
    pub fn new(services: CallServices, observer: Arc<dyn CallObserver>) -> (Self, CallHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let (negotiation_tx, negotiation_rx) = mpsc::unbounded_channel();
        let (relay_tx, relay_rx) = mpsc::unbounded_channel();

        let channel = SignalingChannel::new(services.relay.clone(), relay_tx);
        let engine = NegotiationEngine::spawn(services.peers.clone(), negotiation_tx);

        let session = Self {
            services,
            observer,
            state: CallState::Idle,
            room_state: RoomState::New,
            room: None,
            room_outbox: None,
            channel,
            engine,
            local_sent: false,
            remote_set: false,
            command_rx,
            session_tx,
            session_rx,
            negotiation_rx,
            relay_rx,
        };
        let handle = CallHandle {
            commands: command_tx,
        };
        (session, handle)
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub async fn run(mut self) {
        info!("Call session started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down call session.");
                            break;
                        }
                    }
                }

                Some(evt) = self.session_rx.recv() => {
                    self.handle_session_event(evt).await;
                }

                Some(evt) = self.negotiation_rx.recv() => {
                    self.handle_negotiation_event(evt).await;
                }

                Some(evt) = self.relay_rx.recv() => {
                    self.handle_relay_event(evt).await;
                }
            }
        }

        self.terminate().await;
        info!("Call session finished");
    }

    async fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::Join { room_id } => {
                if self.state != CallState::Idle {
                    warn!("Join ignored in state {:?}", self.state);
                    return;
                }
                info!("Joining room {}", room_id);
                self.set_state(CallState::Joining).await;

                let room = self.services.room.clone();
                let tx = self.session_tx.clone();
                tokio::spawn(async move {
                    let result = room.join(&room_id).await;
                    let _ = tx.send(SessionEvent::Joined(result));
                });
            }

            CallCommand::Hangup => {
                info!("Hang-up requested");
                self.terminate().await;
            }
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Joined(result) => {
                if self.state != CallState::Joining {
                    debug!("Discarding join result in state {:?}", self.state);
                    if let Ok(join) = result {
                        self.leave_abandoned_room(join);
                    }
                    return;
                }

                match result {
                    Ok(join) => self.on_joined(join).await,
                    Err(e) => {
                        error!("Failed to join room: {}", e);
                        self.observer.on_error(CallError::Transport(e)).await;
                        self.terminate().await;
                    }
                }
            }

            SessionEvent::IceServersResolved(result) => {
                if self.state != CallState::AwaitingIceServers {
                    debug!("Discarding ICE servers in state {:?}", self.state);
                    return;
                }

                let servers = match result {
                    Ok(servers) => servers,
                    Err(e) => {
                        warn!("ICE server fetch failed, using room servers only: {}", e);
                        Vec::new()
                    }
                };
                self.start_negotiation(servers).await;
            }
        }
    }

    async fn on_joined(&mut self, join: RoomJoinResult) {
        let session = RoomSession::from_join(join);
        info!(
            "Joined room {} as {} (initiator: {})",
            session.room_id, session.client_id, session.is_initiator
        );

        self.room_outbox = Some(RoomOutbox::spawn(
            self.services.room.clone(),
            session.room_id.clone(),
            session.client_id.clone(),
        ));
        self.room_state = RoomState::Connected;
        self.set_state(CallState::AwaitingIceServers).await;

        let resolver_base = session.ice_resolver_base().map(str::to_owned);
        self.room = Some(session);

        match resolver_base {
            Some(base) => {
                info!("No TURN server from room, asking {}", base);
                let ice = self.services.ice.clone();
                let tx = self.session_tx.clone();
                tokio::spawn(async move {
                    let result = ice.fetch(&base).await;
                    let _ = tx.send(SessionEvent::IceServersResolved(result));
                });
            }
            None => self.start_negotiation(Vec::new()).await,
        }
    }

    async fn start_negotiation(&mut self, extra_servers: Vec<IceServer>) {
        self.set_state(CallState::Negotiating).await;

        let Some(room) = self.room.as_mut() else {
            warn!("Negotiation without room parameters");
            return;
        };
        if !extra_servers.is_empty() && room.extend_ice_servers(extra_servers) {
            debug!("ICE server list extended to {}", room.ice_servers().len());
        }

        self.engine.create_connection(room.ice_servers().to_vec());
        self.channel.open(&room.relay_url);
        self.channel.register(&room.room_id, &room.client_id);

        if room.is_initiator {
            self.engine.create_offer();
            return;
        }

        // Candidates go in first: the engine holds them until the offer is
        // committed and applies them before the answer is created.
        for candidate in room.take_pending_candidates() {
            self.engine.add_remote_candidate(candidate);
        }
        match room.take_pending_offer() {
            Some(offer) => {
                debug!("Applying offer buffered by the room");
                self.engine.set_remote_description(offer);
            }
            None => debug!("No offer waiting in room, answering once it arrives"),
        }
        self.engine.create_answer();
    }

    async fn handle_negotiation_event(&mut self, event: NegotiationEvent) {
        if self.state == CallState::Terminated {
            debug!("Discarding negotiation event after termination: {:?}", event);
            return;
        }

        match event {
            NegotiationEvent::LocalDescriptionReady(desc) => {
                self.send_description(desc);
                self.local_sent = true;
                self.maybe_activate().await;
            }

            NegotiationEvent::RemoteDescriptionSet(kind) => {
                debug!("Remote {} set", kind);
                self.remote_set = true;
                self.maybe_activate().await;
            }

            NegotiationEvent::Peer(PeerEvent::CandidateGenerated(candidate)) => {
                self.send_candidate(candidate);
            }

            NegotiationEvent::Peer(PeerEvent::StateChanged(state)) => match state {
                PeerState::Failed | PeerState::Closed => {
                    warn!("Peer connection {:?}", state);
                    self.terminate().await;
                }
                PeerState::Disconnected => warn!("Peer connection disconnected"),
                other => info!("Peer connection {:?}", other),
            },

            NegotiationEvent::Peer(PeerEvent::RemoteTrack(kind)) => {
                info!("Remote {:?} track added", kind);
                self.observer.on_remote_track(kind).await;
            }

            NegotiationEvent::Failed(e) => {
                self.observer.on_error(CallError::Negotiation(e)).await;
            }
        }
    }

    async fn handle_relay_event(&mut self, event: RelayEvent) {
        if self.state == CallState::Terminated {
            debug!("Discarding relay event after termination: {:?}", event);
            return;
        }

        match event {
            RelayEvent::Opened => self.channel.on_connected(),

            RelayEvent::Message(text) => {
                if !self.channel.accepts_inbound() {
                    debug!("Dropping relay message in state {:?}", self.channel.state());
                    return;
                }
                if let Err(e) = self.engine.handle_signaling_payload(&text) {
                    warn!("Dropping malformed relay message: {}", e);
                }
            }

            RelayEvent::Closed => {
                info!("Relay connection closed");
                self.terminate().await;
            }

            RelayEvent::Failed(e) => {
                error!("Relay connection failed: {}", e);
                self.observer.on_error(CallError::Transport(e)).await;
                self.terminate().await;
            }
        }
    }

    fn send_description(&mut self, desc: SessionDescription) {
        let Some(json) = encode(SignalPayload::from(desc)) else {
            return;
        };
        let initiator = self.room.as_ref().is_some_and(|r| r.is_initiator);

        let via_room = match self.channel.state() {
            SignalingState::Registered => false,
            SignalingState::Connected => initiator,
            SignalingState::New | SignalingState::Closed => true,
        };
        if via_room {
            self.post_to_room(json);
        } else {
            self.channel.send(json);
        }
    }

    fn send_candidate(&mut self, candidate: IceCandidate) {
        if self.room_state != RoomState::Connected {
            debug!("Dropping local candidate, room state {:?}", self.room_state);
            return;
        }
        let Some(json) = encode(SignalPayload::from(candidate)) else {
            return;
        };
        let initiator = self.room.as_ref().is_some_and(|r| r.is_initiator);

        if initiator && !self.channel.is_registered() {
            self.post_to_room(json);
        } else {
            self.channel.send(json);
        }
    }

    fn post_to_room(&self, json: String) {
        match &self.room_outbox {
            Some(outbox) => outbox.post(json),
            None => warn!("Not in a room, dropping message"),
        }
    }

    async fn maybe_activate(&mut self) {
        if self.state == CallState::Negotiating && self.local_sent && self.remote_set {
            self.set_state(CallState::Active).await;
        }
    }

    async fn set_state(&mut self, state: CallState) {
        if self.state == state {
            return;
        }
        info!("Call state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.observer.on_state_change(state).await;
    }

    async fn terminate(&mut self) {
        if self.state == CallState::Terminated {
            return;
        }
        info!("Call state {:?} -> {:?}", self.state, CallState::Terminated);
        self.state = CallState::Terminated;

        self.engine.disconnect();
        self.channel.close();
        if let Some(outbox) = self.room_outbox.take() {
            outbox.abort();
        }

        if self.room_state == RoomState::Connected {
            if let Some(room) = &self.room {
                info!("Leaving room {}", room.room_id);
                let leave = self.services.room.leave(&room.room_id, &room.client_id);
                match tokio::time::timeout(self.services.leave_timeout, leave).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Failed to leave room: {}", e),
                    Err(_) => warn!(
                        "Room server did not acknowledge leave within {:?}",
                        self.services.leave_timeout
                    ),
                }
            }
        }
        self.room_state = RoomState::Terminated;

        self.observer.on_state_change(CallState::Terminated).await;
    }

    /// A join that completed after hang-up still holds a seat.
    fn leave_abandoned_room(&self, join: RoomJoinResult) {
        let room = self.services.room.clone();
        tokio::spawn(async move {
            let params = join.params;
            if let Err(e) = room.leave(&params.room_id, &params.client_id).await {
                warn!("Failed to leave abandoned room: {}", e);
            }
        });
    }
}

/// Posts messages to the room server one at a time, in submission order.
struct RoomOutbox {
    tx: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl RoomOutbox {
    fn spawn(room: Arc<dyn RoomApi>, room_id: String, client_id: String) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = room.post_message(&room_id, &client_id, &message).await {
                    warn!("Failed to post message to room: {}", e);
                }
            }
        });
        Self { tx, task }
    }

    fn post(&self, json: String) {
        if self.tx.send(json).is_err() {
            warn!("Room outbox closed, dropping message");
        }
    }

    /// Stops posting at once. Queued messages and any post in flight are dropped.
    fn abort(self) {
        self.task.abort();
    }
}

fn encode(payload: SignalPayload) -> Option<String> {
    match payload.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize signaling payload: {}", e);
            None
        }
    }
}
