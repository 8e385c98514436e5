use crate::error::TransportError;
use crate::signaling::{RelayConnector, RelayEvent, RelaySink};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

enum RelayFrame {
    Text(String),
    Close,
}

struct WsSink {
    tx: mpsc::UnboundedSender<RelayFrame>,
}

impl RelaySink for WsSink {
    fn send_text(&self, text: String) {
        if self.tx.send(RelayFrame::Text(text)).is_err() {
            debug!("Relay writer gone, frame dropped");
        }
    }

    fn close(&self) {
        let _ = self.tx.send(RelayFrame::Close);
    }
}

/// Relay connections over WebSocket.
#[derive(Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl RelayConnector for WsConnector {
    fn connect(&self, url: &str, events: mpsc::UnboundedSender<RelayEvent>) -> Box<dyn RelaySink> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_socket(url.to_owned(), self.connect_timeout, rx, events));
        Box::new(WsSink { tx })
    }
}

async fn run_socket(
    url: String,
    connect_timeout: Duration,
    mut rx: mpsc::UnboundedReceiver<RelayFrame>,
    events: mpsc::UnboundedSender<RelayEvent>,
) {
    let socket = match tokio::time::timeout(connect_timeout, connect_async(url.as_str())).await {
        Ok(Ok((socket, _response))) => socket,
        Ok(Err(e)) => {
            warn!("Relay connection to {} failed: {}", url, e);
            let _ = events.send(RelayEvent::Failed(TransportError::WebSocket(e)));
            return;
        }
        Err(_) => {
            warn!("Relay connection to {} timed out", url);
            let _ = events.send(RelayEvent::Failed(TransportError::Timeout));
            return;
        }
    };

    info!("Relay socket open: {}", url);
    let _ = events.send(RelayEvent::Opened);

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                RelayFrame::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                RelayFrame::Close => {
                    let _ = sender.close().await;
                    break;
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let events = events.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        if events.send(RelayEvent::Message(text.as_str().to_owned())).is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    info!("Relay socket closed: {}", url);
    let _ = events.send(RelayEvent::Closed);
}
