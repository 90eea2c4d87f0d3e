//! Solr Bridge - bridge query translation and request building for Solr.
//!
//! A bridge query is a template such as `message:<%= parameter["level"] %>`,
//! or a JSON envelope selecting one of two small DSLs. This crate turns it
//! into a lucene query string and assembles the select request around it.
//! The [`adapter`] module runs those requests against a Solr server.
//!
//! # Example
//!
//! ```rust
//! use solr_bridge::{build, parse, ParameterMap, QueryMethod, RequestMetadata};
//!
//! let mut parameters = ParameterMap::new();
//! parameters.insert("log level".to_string(), "error".to_string());
//!
//! let query = parse(r#"message:<%= parameter["log level"] %>"#, Some(&parameters))?;
//! assert_eq!(query.as_str(), "message:error");
//!
//! let request = build(QueryMethod::Count, &query, &RequestMetadata::default());
//! assert_eq!(request.to_query_string(), "q=message%3Aerror&rows=0&wt=json");
//! # Ok::<(), solr_bridge::BridgeError>(())
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod qualification;
pub mod request;

// Re-export commonly used types
pub use adapter::{BridgeRequest, Record, RecordList, ReqwestTransport, SolrAdapter, SolrTransport};
pub use config::{Credentials, SolrConfig};
pub use error::{BridgeError, Result};
pub use qualification::{parse, root_path, BridgeQuery, ParameterMap, ParsedQuery, QueryStyle};
pub use request::{build, BuiltRequest, QueryMethod, RequestMetadata, SortDirection, SortField};
