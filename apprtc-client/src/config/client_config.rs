use crate::error::TransportError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ROOM_SERVER: &str = "http://localhost:8080/";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub room_server_url: Url,
    /// Connection setup for room/ICE requests and the relay socket handshake.
    pub connect_timeout: Duration,
    /// Whole room/ICE request, response body included. Also bounds the
    /// room leave during teardown.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(room_server_url: &str) -> Result<Self, TransportError> {
        Ok(Self {
            room_server_url: Url::parse(room_server_url)?,
            ..Default::default()
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The single HTTP client handed to the room client and the ICE resolver.
    pub fn http_client(&self) -> Result<reqwest::Client, TransportError> {
        Ok(reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()?)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            room_server_url: Url::parse(DEFAULT_ROOM_SERVER)
                .expect("default room server url is valid"),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
