use crate::signaling::{RelayConnector, RelayEvent, RelaySink, SignalingState};
use apprtc_core::{RelayCommand, SignalPayload};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// The persistent relay connection.
///
/// Messages sent while the socket is connected but not yet registered are
/// held in an outbound queue and flushed, in order, right after registration.
pub struct SignalingChannel {
    connector: Arc<dyn RelayConnector>,
    events: mpsc::UnboundedSender<RelayEvent>,
    state: SignalingState,
    sink: Option<Box<dyn RelaySink>>,
    queue: VecDeque<String>,
    registration: Option<(String, String)>,
}

impl SignalingChannel {
    pub fn new(connector: Arc<dyn RelayConnector>, events: mpsc::UnboundedSender<RelayEvent>) -> Self {
        Self {
            connector,
            events,
            state: SignalingState::New,
            sink: None,
            queue: VecDeque::new(),
            registration: None,
        }
    }

    pub fn state(&self) -> SignalingState {
        self.state
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_registered(&self) -> bool {
        self.state == SignalingState::Registered
    }

    /// Inbound frames are only meaningful on a live socket.
    pub fn accepts_inbound(&self) -> bool {
        matches!(
            self.state,
            SignalingState::Connected | SignalingState::Registered
        )
    }

    pub fn open(&mut self, url: &str) {
        if self.state != SignalingState::New || self.sink.is_some() {
            debug!("Relay already opened (state {:?})", self.state);
            return;
        }

        info!("Connecting to relay {}", url);
        self.sink = Some(self.connector.connect(url, self.events.clone()));
    }

    /// Handshake finished. Performs a registration requested earlier, if any.
    pub fn on_connected(&mut self) {
        if self.state != SignalingState::New {
            warn!("Relay reported open in state {:?}", self.state);
            return;
        }

        info!("Relay connected");
        self.state = SignalingState::Connected;

        if let Some((room_id, client_id)) = self.registration.clone() {
            self.register(&room_id, &client_id);
        }
    }

    /// Returns whether the registration frame was sent now. Before the socket
    /// is connected the ids are kept and registration happens in `on_connected`.
    pub fn register(&mut self, room_id: &str, client_id: &str) -> bool {
        self.registration = Some((room_id.to_owned(), client_id.to_owned()));

        if self.state != SignalingState::Connected {
            debug!("Registration deferred (state {:?})", self.state);
            return false;
        }

        let frame = RelayCommand::Register {
            roomid: room_id.to_owned(),
            clientid: client_id.to_owned(),
        };
        match frame.to_json() {
            Ok(json) => self.transmit(json),
            Err(e) => {
                error!("Failed to serialize register frame: {}", e);
                return false;
            }
        }
        self.state = SignalingState::Registered;
        info!("Registered on relay as {} in room {}", client_id, room_id);

        let queued: Vec<String> = self.queue.drain(..).collect();
        if !queued.is_empty() {
            debug!("Flushing {} queued relay messages", queued.len());
        }
        for message in queued {
            self.send(message);
        }
        true
    }

    pub fn send(&mut self, message: String) {
        match self.state {
            SignalingState::Connected => {
                debug!("Queueing relay message until registered");
                self.queue.push_back(message);
            }
            SignalingState::Registered => match (RelayCommand::Send { msg: message }).to_json() {
                Ok(json) => self.transmit(json),
                Err(e) => error!("Failed to serialize relay frame: {}", e),
            },
            SignalingState::Closed => {
                self.transmit(message);
                if let Some(sink) = &self.sink {
                    sink.close();
                }
            }
            SignalingState::New => {
                debug!("Dropping relay message, socket not connected: {}", message);
            }
        }
    }

    /// Moves to `Closed` and sends a final `bye`. Calling it again does nothing.
    pub fn close(&mut self) {
        if self.state == SignalingState::Closed {
            return;
        }

        if !self.queue.is_empty() {
            warn!("Discarding {} unsent relay messages", self.queue.len());
            self.queue.clear();
        }
        self.state = SignalingState::Closed;

        match SignalPayload::Bye.to_json() {
            Ok(bye) => self.send(bye),
            Err(e) => error!("Failed to serialize bye: {}", e),
        }
    }

    fn transmit(&self, text: String) {
        match &self.sink {
            Some(sink) => sink.send_text(text),
            None => debug!("No relay socket, dropping frame"),
        }
    }
}
