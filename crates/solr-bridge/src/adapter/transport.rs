//! HTTP transport for Solr requests.

use crate::config::{Credentials, NetworkConfig};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{trace, warn};
use url::Url;

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests against a Solr server.
///
/// Non-2xx statuses are returned, not turned into errors; only failing to
/// get a response at all is an error.
#[async_trait]
pub trait SolrTransport: Send + Sync {
    async fn get(&self, url: &Url, credentials: Option<&Credentials>) -> Result<TransportResponse>;
}

/// [`SolrTransport`] over a reqwest client, using HTTP basic auth.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| BridgeError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SolrTransport for ReqwestTransport {
    async fn get(&self, url: &Url, credentials: Option<&Credentials>) -> Result<TransportResponse> {
        let mut request = self.client.get(url.clone());
        if let Some(credentials) = credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(|e| {
            warn!("GET {} failed: {}", url, e);
            BridgeError::Network {
                message: "Unable to make a connection to the Solr server".to_string(),
                cause: Some(e.to_string()),
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        trace!("Request response code: {}", status);

        Ok(TransportResponse { status, body })
    }
}
