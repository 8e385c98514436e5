use serde::{Deserialize, Deserializer, Serialize};

const RELAY_SCHEME: &str = "turn:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    #[serde(deserialize_with = "one_or_many")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn with_credentials(mut self, username: Option<String>, credential: Option<String>) -> Self {
        self.username = username;
        self.credential = credential;
        self
    }

    /// True when at least one url points at a TURN relay.
    pub fn is_relay(&self) -> bool {
        self.urls.iter().any(|url| url.starts_with(RELAY_SCHEME))
    }

    /// Splits this entry into one entry per url, all sharing the same credentials.
    pub fn fan_out(&self) -> Vec<IceServer> {
        self.urls
            .iter()
            .map(|url| {
                IceServer::new(url.clone())
                    .with_credentials(self.username.clone(), self.credential.clone())
            })
            .collect()
    }
}

/// Room servers send `urls` either as a bare string or as an array.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
    })
}
