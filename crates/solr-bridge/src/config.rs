//! Centralized configuration for the Solr bridge.
//!
//! This module provides the constants shared by query translation and request
//! building, plus the runtime connection settings for the adapter.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Bridge query syntax: placeholder tags, DSL names and envelope keys.
pub struct QueryConfig;

impl QueryConfig {
    pub const KINETIC_DSL: &'static str = "Kinetic DSL";
    pub const SOLR_DSL: &'static str = "Solr DSL";

    // Envelope keys
    pub const TYPE_KEY: &'static str = "type";
    pub const QUERY_KEY: &'static str = "query";
    pub const CONCATENATING_OPERATOR_KEY: &'static str = "concatenatingOperator";
    pub const QUERY_PREFIX_KEY: &'static str = "queryPrefix";
    pub const WHITELISTED_FIELDS_KEY: &'static str = "whitelistedFields";
    pub const ROOT_PATH_KEY: &'static str = "jsonRootPath";

    // Field match keys
    pub const MATCHER_KEY: &'static str = "matcher";
    pub const VALUE_KEY: &'static str = "value";

    pub const DEFAULT_CONCATENATING_OPERATOR: &'static str = "AND";

    /// Every DSL name an envelope may declare.
    pub fn query_styles() -> Vec<&'static str> {
        vec![Self::KINETIC_DSL, Self::SOLR_DSL]
    }
}

/// Defaults for the outbound select request.
pub struct RequestConfig;

impl RequestConfig {
    pub const DEFAULT_PAGE_SIZE: u64 = 1000;
    pub const DEFAULT_OFFSET: u64 = 0;
    pub const MATCH_ALL_QUERY: &'static str = "*:*";
    /// Field prefix used by the Elasticsearch bridge and meaningless to Solr.
    pub const STRUCTURAL_PREFIX: &'static str = "_source.";
    pub const RESPONSE_WRITER: &'static str = "json";
    pub const SELECT_HANDLER: &'static str = "select";

    // Raw bridge metadata keys
    pub const PAGE_SIZE_KEY: &'static str = "pageSize";
    pub const OFFSET_KEY: &'static str = "offset";
    pub const PAGE_NUMBER_KEY: &'static str = "pageNumber";
    pub const ORDER_KEY: &'static str = "order";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = "solr-bridge/0.1";
    pub const CORE_STATUS_PATH: &'static str = "admin/cores?action=STATUS";
}

/// Adapter property names, as shown to whoever configures the bridge.
pub struct PropertyNames;

impl PropertyNames {
    pub const USERNAME: &'static str = "Username";
    pub const PASSWORD: &'static str = "Password";
    pub const API_URL: &'static str = "Solr URL";
}

/// Basic authentication credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings for a Solr server.
#[derive(Clone, Serialize, Deserialize)]
pub struct SolrConfig {
    /// Base URL, e.g. `http://localhost:8983/solr`. Never ends with `/`.
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for SolrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolrConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SolrConfig {
    /// Create a config for `url`, dropping one trailing slash.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::Config {
                message: format!("the '{}' property is required", PropertyNames::API_URL),
            });
        }
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        Ok(Self {
            url: trimmed.to_string(),
            username: None,
            password: None,
        })
    }

    /// Set basic authentication credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Build a config from the adapter property map.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let url = properties
            .get(PropertyNames::API_URL)
            .cloned()
            .unwrap_or_default();
        let mut config = Self::new(url)?;
        config.username = properties.get(PropertyNames::USERNAME).cloned();
        config.password = properties.get(PropertyNames::PASSWORD).cloned();
        Ok(config)
    }

    /// Credentials to send, present only when both username and password are set.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_stripped() {
        let config = SolrConfig::new("http://localhost:8983/solr/").unwrap();
        assert_eq!(config.url, "http://localhost:8983/solr");

        let config = SolrConfig::new("http://localhost:8983/solr").unwrap();
        assert_eq!(config.url, "http://localhost:8983/solr");
    }

    #[test]
    fn test_blank_url_rejected() {
        assert!(matches!(
            SolrConfig::new("  "),
            Err(BridgeError::Config { .. })
        ));
    }

    #[test]
    fn test_from_properties() {
        let mut properties = HashMap::new();
        properties.insert("Solr URL".to_string(), "http://solr:8983/solr/".to_string());
        properties.insert("Username".to_string(), "admin".to_string());

        let config = SolrConfig::from_properties(&properties).unwrap();
        assert_eq!(config.url, "http://solr:8983/solr");
        // Password missing, so no credentials are sent.
        assert!(config.credentials().is_none());

        properties.insert("Password".to_string(), "secret".to_string());
        let config = SolrConfig::from_properties(&properties).unwrap();
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username, "admin");
        assert!(!format!("{:?}", credentials).contains("secret"));
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_query_styles() {
        assert_eq!(QueryConfig::query_styles(), vec!["Kinetic DSL", "Solr DSL"]);
        assert!(NetworkConfig::REQUEST_TIMEOUT > Duration::ZERO);
    }
}
