use crate::error::TransportError;
use tokio::sync::mpsc;

/// Events pushed by the relay socket into the owning session.
#[derive(Debug)]
pub enum RelayEvent {
    /// Handshake completed.
    Opened,
    /// A text frame arrived.
    Message(String),
    /// The socket is gone (closed by either side).
    Closed,
    /// The socket never opened.
    Failed(TransportError),
}

/// Write half of a relay connection.
pub trait RelaySink: Send + Sync {
    fn send_text(&self, text: String);

    fn close(&self);
}

/// Opens relay connections.
///
/// `connect` must not block: the handshake happens in the background and is
/// reported through `events`. Frames given to the sink before `Opened` may be
/// dropped.
pub trait RelayConnector: Send + Sync {
    fn connect(&self, url: &str, events: mpsc::UnboundedSender<RelayEvent>) -> Box<dyn RelaySink>;
}
