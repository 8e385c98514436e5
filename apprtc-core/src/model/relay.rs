use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// Control frames written to the relay socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum RelayCommand {
    Register { roomid: String, clientid: String },
    Send { msg: String },
}

impl RelayCommand {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frame delivered by the relay: `{msg: <payload-string>, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayEnvelope {
    msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RelayEnvelope {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let envelope: RelayEnvelope = serde_json::from_str(text)?;
        if envelope.msg.is_none() {
            return Err(ProtocolError::MissingField("msg"));
        }
        Ok(envelope)
    }

    /// The wrapped payload, or `None` when the relay delivered an empty body.
    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref().filter(|msg| !msg.is_empty())
    }

    pub fn relay_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|err| !err.is_empty())
    }
}
