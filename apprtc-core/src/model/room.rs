use crate::error::ProtocolError;
use crate::model::IceServer;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const JOIN_SUCCESS: &str = "SUCCESS";

/// Body of `POST /join/{room}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinResponse {
    pub result: String,
    #[serde(default)]
    params: Value,
}

impl JoinResponse {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_success(&self) -> bool {
        self.result == JOIN_SUCCESS
    }

    pub fn params(&self) -> Result<RoomParams, ProtocolError> {
        if self.params.is_null() {
            return Err(ProtocolError::MissingField("params"));
        }
        Ok(decode_embedded(self.params.clone())?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomParams {
    pub room_id: String,
    pub client_id: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub is_initiator: bool,
    pub wss_url: String,
    pub wss_post_url: String,
    #[serde(default, deserialize_with = "embedded")]
    pub pc_config: PcConfig,
    /// Messages the first participant already posted; each entry is a
    /// JSON-encoded negotiation payload.
    #[serde(default, deserialize_with = "embedded")]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub ice_server_url: Option<String>,
}

impl RoomParams {
    /// Base url of the ICE credential service, i.e. `ice_server_url` cut
    /// before its `iceconfig` path.
    pub fn ice_resolver_base(&self) -> Option<&str> {
        let url = self.ice_server_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        url.split("iceconfig").next().filter(|base| !base.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PcConfig {
    #[serde(default, rename = "iceServers")]
    pub ice_servers: Vec<IceServer>,
}

/// Body of `GET <base>/iceconfig`.
#[derive(Debug, Clone, Deserialize)]
pub struct IceConfigResponse {
    #[serde(default, rename = "iceServers")]
    pub ice_servers: Vec<IceServer>,
}

impl IceConfigResponse {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Decodes a value the room server may have serialized twice.
pub fn decode_embedded<T: DeserializeOwned>(value: Value) -> Result<T, serde_json::Error> {
    match value {
        Value::String(text) => serde_json::from_str(&text),
        other => serde_json::from_value(other),
    }
}

fn embedded<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::String(text) if text.trim().is_empty() => Ok(T::default()),
        value => decode_embedded(value).map_err(D::Error::custom),
    }
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Ok(flag),
        Value::String(text) => match text.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(D::Error::custom(format!("expected boolean, got `{other}`"))),
        },
        other => Err(D::Error::custom(format!("expected boolean, got {other}"))),
    }
}
