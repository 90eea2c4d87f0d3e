//! Solr bridge adapter: count, retrieve and search over a Solr select handler.
//!
//! # Module Organization
//!
//! - [`transport`] - HTTP GET abstraction and the reqwest implementation
//! - [`records`] - Flattening of response documents into records

mod records;
mod transport;

pub use records::{flatten_document, map_documents, record_nodes, Record, RecordList};
pub use transport::{ReqwestTransport, SolrTransport, TransportResponse};

use crate::config::{NetworkConfig, SolrConfig};
use crate::error::{BridgeError, Result};
use crate::qualification::{BridgeQuery, ParameterMap};
use crate::request::{build, QueryMethod, RequestMetadata};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use url::Url;

/// A request as the bridge hands it to the adapter.
#[derive(Debug, Clone, Default)]
pub struct BridgeRequest {
    /// Solr core or collection name.
    pub structure: String,
    /// Bridge query template or envelope.
    pub query: String,
    pub parameters: Option<ParameterMap>,
    /// Raw metadata: `pageSize`, `offset`, `pageNumber`, `order`.
    pub metadata: HashMap<String, String>,
    pub fields: Vec<String>,
}

impl BridgeRequest {
    pub fn new(structure: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            structure: structure.into(),
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(ParameterMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectBody {
    num_found: u64,
    #[serde(default)]
    docs: Vec<Value>,
}

/// Select URL plus the root path the query declared.
struct PreparedSelect {
    url: Url,
    root_path: Option<String>,
}

/// Adapter answering bridge requests from a Solr server.
pub struct SolrAdapter {
    config: SolrConfig,
    transport: Arc<dyn SolrTransport>,
}

impl std::fmt::Debug for SolrAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolrAdapter")
            .field("config", &self.config)
            .finish()
    }
}

impl SolrAdapter {
    pub const NAME: &'static str = "Solr Bridge";
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    pub fn new(config: SolrConfig, transport: Arc<dyn SolrTransport>) -> Self {
        Self { config, transport }
    }

    /// Create an adapter using [`ReqwestTransport`].
    pub fn with_reqwest(config: SolrConfig) -> Result<Self> {
        Ok(Self::new(config, Arc::new(ReqwestTransport::new()?)))
    }

    pub fn config(&self) -> &SolrConfig {
        &self.config
    }

    /// Check the server is reachable and accepts the configured credentials.
    pub async fn initialize(&self) -> Result<()> {
        debug!("Testing the authentication credentials");
        let url = Url::parse(&format!(
            "{}/{}",
            self.config.url,
            NetworkConfig::CORE_STATUS_PATH
        ))?;

        let response = self
            .transport
            .get(&url, self.config.credentials().as_ref())
            .await?;

        match response.status {
            401 => {
                warn!("Solr rejected the configured credentials");
                Err(BridgeError::Unauthorized)
            }
            status if !response.is_success() => {
                warn!("Solr core status check returned {}", status);
                Err(BridgeError::HttpStatus { status })
            }
            _ => {
                info!("Connected to Solr at {}", self.config.url);
                Ok(())
            }
        }
    }

    fn prepare(&self, method: QueryMethod, request: &BridgeRequest) -> Result<PreparedSelect> {
        let query = BridgeQuery::new(&request.query)?;
        let parsed = query.parse(request.parameters.as_ref())?;
        let metadata = RequestMetadata::from_bridge_metadata(&request.metadata, request.fields.clone())?;
        let url = build(method, &parsed, &metadata).to_url(&self.config.url, &request.structure)?;

        Ok(PreparedSelect {
            url,
            root_path: query.root_path().map(str::to_string),
        })
    }

    /// The select URL a request translates to.
    pub fn build_url(&self, method: QueryMethod, request: &BridgeRequest) -> Result<Url> {
        Ok(self.prepare(method, request)?.url)
    }

    async fn select(&self, url: &Url) -> Result<SelectBody> {
        debug!("Solr select: {}", url);
        let response = self
            .transport
            .get(url, self.config.credentials().as_ref())
            .await?;

        if !response.is_success() {
            warn!("Solr select returned {}", response.status);
            return Err(BridgeError::HttpStatus {
                status: response.status,
            });
        }
        trace!("Solr response - Raw Output: {}", response.body);

        let parsed: SelectResponse =
            serde_json::from_str(&response.body).map_err(|e| BridgeError::InvalidResponse {
                message: format!("unexpected select response: {}", e),
            })?;
        Ok(parsed.response)
    }

    /// Number of documents matching the request.
    pub async fn count(&self, request: &BridgeRequest) -> Result<u64> {
        let prepared = self.prepare(QueryMethod::Count, request)?;
        Ok(self.select(&prepared.url).await?.num_found)
    }

    /// The single record matching the request, if any.
    pub async fn retrieve(&self, request: &BridgeRequest) -> Result<Option<Record>> {
        let prepared = self.prepare(QueryMethod::Search, request)?;
        let body = self.select(&prepared.url).await?;

        match body.num_found {
            0 => Ok(None),
            1 => Ok(map_documents(&body.docs, prepared.root_path.as_deref())
                .into_iter()
                .next()),
            count => Err(BridgeError::MultipleResults { count }),
        }
    }

    /// All records on the requested page.
    pub async fn search(&self, request: &BridgeRequest) -> Result<RecordList> {
        let prepared = self.prepare(QueryMethod::Search, request)?;
        let body = self.select(&prepared.url).await?;

        let records = map_documents(&body.docs, prepared.root_path.as_deref());
        debug!(
            "Solr search matched {} documents, returning {} records",
            body.num_found,
            records.len()
        );
        Ok(RecordList::new(records, &request.fields))
    }
}
