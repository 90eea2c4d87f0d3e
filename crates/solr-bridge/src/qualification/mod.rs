//! Bridge query qualification: templated bridge queries to lucene syntax.
//!
//! This module provides:
//! - Placeholder normalization and parameter substitution
//! - Lucene and JSON escaping of parameter values
//! - Detection of JSON query envelopes
//! - The Kinetic (structured-match) and Solr (raw-fragment) DSL interpreters
//!
//! Parsing runs as a pipeline: normalize placeholders, detect an envelope
//! once, then dispatch to the interpreter the envelope declares, or
//! substitute directly into a plain template.

mod envelope;
mod escape;
mod kinetic;
mod placeholder;
mod solr;

pub use envelope::{detect, looks_like_envelope, DetectedQuery, QueryEnvelope, QueryStyle};
pub use escape::{escape_json_scalar, escape_lucene};
pub use kinetic::{build_kinetic_query, FieldMatch, KineticInterpreter, KineticOptions, Matcher};
pub use placeholder::{
    has_placeholders, normalize_placeholders, referenced_parameters, substitute, ParameterMap,
    SubstitutionMode,
};
pub use solr::{build_solr_query, SolrInterpreter};

use crate::error::Result;
use tracing::debug;

/// Turns an envelope and its parameters into a lucene query string.
pub trait DslInterpreter {
    fn interpret(&self, envelope: &QueryEnvelope, parameters: Option<&ParameterMap>)
        -> Result<String>;
}

impl QueryStyle {
    /// The interpreter for queries declaring this style.
    pub fn interpreter(&self) -> &'static dyn DslInterpreter {
        match self {
            QueryStyle::Kinetic => &KineticInterpreter,
            QueryStyle::Solr => &SolrInterpreter,
        }
    }
}

/// A lucene query ready for the `q` parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery(String);

impl ParsedQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ParsedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A bridge query whose envelope detection has already run.
///
/// Detection happens once in [`BridgeQuery::new`]; `parse` and `root_path`
/// both read the stored outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeQuery {
    detected: DetectedQuery,
}

impl BridgeQuery {
    /// Normalize placeholders and detect an envelope.
    pub fn new(raw_query: &str) -> Result<Self> {
        let normalized = normalize_placeholders(raw_query);
        let detected = detect(&normalized)?;
        Ok(Self { detected })
    }

    pub fn detected(&self) -> &DetectedQuery {
        &self.detected
    }

    /// Produce the lucene query.
    pub fn parse(&self, parameters: Option<&ParameterMap>) -> Result<ParsedQuery> {
        let lucene = match &self.detected {
            DetectedQuery::Envelope(envelope) => {
                let style = envelope.style()?;
                debug!("Interpreting bridge query as {}", style);
                style.interpreter().interpret(envelope, parameters)?
            }
            DetectedQuery::Plain(template) => build_solr_query(false, template, parameters)?,
        };
        Ok(ParsedQuery(lucene))
    }

    /// The envelope's `jsonRootPath`, if any.
    pub fn root_path(&self) -> Option<&str> {
        self.detected.envelope().and_then(QueryEnvelope::root_path)
    }
}

/// Translate a bridge query into lucene syntax.
pub fn parse(raw_query: &str, parameters: Option<&ParameterMap>) -> Result<ParsedQuery> {
    BridgeQuery::new(raw_query)?.parse(parameters)
}

/// The root path an envelope declares for flattening response documents.
pub fn root_path(raw_query: &str) -> Result<Option<String>> {
    Ok(BridgeQuery::new(raw_query)?.root_path().map(str::to_string))
}
