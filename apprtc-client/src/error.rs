use apprtc_core::ProtocolError;
use std::fmt;
use thiserror::Error;

/// A request/response or relay-socket failure.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { status: u16, url: String },

    #[error("room server refused the request: {0}")]
    Rejected(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("relay socket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("connect timed out")]
    Timeout,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl From<url::ParseError> for TransportError {
    fn from(e: url::ParseError) -> Self {
        TransportError::InvalidUrl(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStep {
    CreateConnection,
    CreateOffer,
    CreateAnswer,
    SetLocalDescription,
    SetRemoteDescription,
    AddIceCandidate,
}

impl fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationStep::CreateConnection => "create connection",
            NegotiationStep::CreateOffer => "create offer",
            NegotiationStep::CreateAnswer => "create answer",
            NegotiationStep::SetLocalDescription => "set local description",
            NegotiationStep::SetRemoteDescription => "set remote description",
            NegotiationStep::AddIceCandidate => "add ice candidate",
        };
        f.write_str(name)
    }
}

/// The peer connection engine rejected a negotiation step.
#[derive(Debug, Clone, Error)]
#[error("{step} failed: {reason}")]
pub struct NegotiationError {
    pub step: NegotiationStep,
    pub reason: String,
}

impl NegotiationError {
    pub fn new(step: NegotiationStep, err: impl fmt::Display) -> Self {
        Self {
            step,
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
}
