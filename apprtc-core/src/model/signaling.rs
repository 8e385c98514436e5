use crate::error::ProtocolError;
use crate::model::{IceCandidate, SdpKind, SessionDescription};
use serde::{Deserialize, Serialize};

/// Negotiation message exchanged with the remote peer, either through the
/// room server or wrapped in a relay frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalPayload {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        #[serde(rename = "label")]
        sdp_m_line_index: u16,
        #[serde(rename = "id")]
        sdp_mid: String,
        candidate: String,
    },
    Bye,
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    sdp: Option<String>,
    id: Option<String>,
    label: Option<u16>,
    candidate: Option<String>,
}

impl SignalPayload {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawPayload = serde_json::from_str(text)?;
        Self::from_raw(raw)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        let raw: RawPayload = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawPayload) -> Result<Self, ProtocolError> {
        let kind = raw.kind.ok_or(ProtocolError::MissingField("type"))?;

        match kind.as_str() {
            "offer" => Ok(SignalPayload::Offer {
                sdp: raw.sdp.ok_or(ProtocolError::MissingField("sdp"))?,
            }),
            "answer" => Ok(SignalPayload::Answer {
                sdp: raw.sdp.ok_or(ProtocolError::MissingField("sdp"))?,
            }),
            "candidate" => Ok(SignalPayload::Candidate {
                sdp_m_line_index: raw.label.ok_or(ProtocolError::MissingField("label"))?,
                sdp_mid: raw.id.ok_or(ProtocolError::MissingField("id"))?,
                candidate: raw.candidate.ok_or(ProtocolError::MissingField("candidate"))?,
            }),
            "bye" => Ok(SignalPayload::Bye),
            _ => Err(ProtocolError::UnknownType(kind)),
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn description(&self) -> Option<SessionDescription> {
        match self {
            SignalPayload::Offer { sdp } => Some(SessionDescription::offer(sdp.clone())),
            SignalPayload::Answer { sdp } => Some(SessionDescription::answer(sdp.clone())),
            _ => None,
        }
    }

    pub fn ice_candidate(&self) -> Option<IceCandidate> {
        match self {
            SignalPayload::Candidate {
                sdp_m_line_index,
                sdp_mid,
                candidate,
            } => Some(IceCandidate::new(
                sdp_mid.clone(),
                *sdp_m_line_index,
                candidate.clone(),
            )),
            _ => None,
        }
    }
}

impl From<SessionDescription> for SignalPayload {
    fn from(desc: SessionDescription) -> Self {
        match desc.kind {
            SdpKind::Offer => SignalPayload::Offer { sdp: desc.sdp },
            SdpKind::Answer => SignalPayload::Answer { sdp: desc.sdp },
        }
    }
}

impl From<IceCandidate> for SignalPayload {
    fn from(c: IceCandidate) -> Self {
        SignalPayload::Candidate {
            sdp_m_line_index: c.sdp_m_line_index,
            sdp_mid: c.sdp_mid,
            candidate: c.candidate,
        }
    }
}
