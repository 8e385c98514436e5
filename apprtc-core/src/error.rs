use thiserror::Error;

/// A room-server or relay message that could not be understood.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unknown message type `{0}`")]
    UnknownType(String),
}
