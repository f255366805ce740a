//! HTTP transport for the RPC client (reqwest).

use super::{ApiTransport, RpcError};
use crate::domain::config::{HttpMethod, WebappifyConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct HttpTransport {
    client: Client,
    url: String,
    method: HttpMethod,
}

impl HttpTransport {
    pub fn new(url: String, method: HttpMethod, client: Client) -> Self {
        Self { client, url, method }
    }

    pub fn from_config(config: &WebappifyConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::new(config.endpoint_url(), config.method, client))
    }
}

fn transport_error(e: reqwest::Error) -> RpcError {
    if e.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::Network(e.to_string())
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn exchange(&self, envelope: &str) -> Result<String, RpcError> {
        let request = match self.method {
            HttpMethod::Post => self.client.post(&self.url).form(&[("api", envelope)]),
            HttpMethod::Get => self.client.get(&self.url).query(&[("api", envelope)]),
        };

        let response = request.send().await.map_err(transport_error)?;
        // The body is decoded regardless of status; error pages fail as non-JSON.
        tracing::debug!("Backend answered {} from {}", response.status(), self.url);
        response.text().await.map_err(transport_error)
    }
}
