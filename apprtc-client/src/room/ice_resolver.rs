use crate::error::TransportError;
use crate::room::IceApi;
use apprtc_core::{IceConfigResponse, IceServer};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

const ICE_CONFIG_PATH: &str = "iceconfig";

#[derive(Clone)]
pub struct IceResolver {
    http: Client,
}

impl IceResolver {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    fn config_url(base_url: &str) -> Result<Url, TransportError> {
        let mut base = base_url.to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?.join(ICE_CONFIG_PATH)?)
    }
}

#[async_trait]
impl IceApi for IceResolver {
    async fn fetch(&self, base_url: &str) -> Result<Vec<IceServer>, TransportError> {
        let url = Self::config_url(base_url)?;
        debug!("GET {}", url);

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let config = IceConfigResponse::from_json(&response.text().await?)?;
        let servers: Vec<IceServer> = config.ice_servers.iter().flat_map(IceServer::fan_out).collect();
        info!("Resolved {} ICE server entries from {}", servers.len(), url);
        Ok(servers)
    }
}
