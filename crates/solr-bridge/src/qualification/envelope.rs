//! Query envelope detection.
//!
//! A bridge query whose trimmed text starts with `{` and ends with `}` is a
//! JSON envelope describing how its nested `query` should be interpreted.
//! Anything else is a plain lucene template.

use crate::config::QueryConfig;
use crate::error::{BridgeError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// The DSL an envelope declares in its `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStyle {
    /// Field name to `{matcher, value}` objects, joined into a boolean query.
    Kinetic,
    /// A lucene fragment carried as a JSON string.
    Solr,
}

impl QueryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStyle::Kinetic => QueryConfig::KINETIC_DSL,
            QueryStyle::Solr => QueryConfig::SOLR_DSL,
        }
    }

    /// Match a declared type name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        [QueryStyle::Kinetic, QueryStyle::Solr]
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for QueryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed query envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEnvelope {
    fields: Map<String, Value>,
}

impl QueryEnvelope {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// The declared `type`, as written.
    pub fn declared_type(&self) -> Option<&str> {
        self.str_field(QueryConfig::TYPE_KEY)
    }

    /// Resolve the declared `type` to a supported style.
    pub fn style(&self) -> Result<QueryStyle> {
        let declared = self.declared_type().unwrap_or_default();
        QueryStyle::from_name(declared).ok_or_else(|| BridgeError::UnknownQueryType {
            found: declared.to_string(),
            valid: QueryConfig::query_styles(),
        })
    }

    /// The nested query text.
    ///
    /// A nested JSON object is accepted as well and returned serialized.
    pub fn query(&self) -> Option<String> {
        match self.fields.get(QueryConfig::QUERY_KEY)? {
            Value::String(query) => Some(query.clone()),
            object @ Value::Object(_) => Some(object.to_string()),
            _ => None,
        }
    }

    /// Boolean operator joining structured clauses, `AND` unless given.
    pub fn concatenating_operator(&self) -> &str {
        self.str_field(QueryConfig::CONCATENATING_OPERATOR_KEY)
            .map(str::trim)
            .filter(|op| !op.is_empty())
            .unwrap_or(QueryConfig::DEFAULT_CONCATENATING_OPERATOR)
    }

    pub fn query_prefix(&self) -> Option<&str> {
        self.str_field(QueryConfig::QUERY_PREFIX_KEY)
    }

    /// Fields allowed to take part in a structured match, `None` when unrestricted.
    pub fn whitelisted_fields(&self) -> Option<Vec<&str>> {
        self.fields
            .get(QueryConfig::WHITELISTED_FIELDS_KEY)
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
    }

    /// Path to the node of each response document that holds the record.
    pub fn root_path(&self) -> Option<&str> {
        self.str_field(QueryConfig::ROOT_PATH_KEY)
            .filter(|path| !path.trim().is_empty())
    }
}

/// Outcome of envelope detection, computed once per bridge query.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectedQuery {
    /// A lucene template, possibly with placeholders.
    Plain(String),
    /// A JSON envelope.
    Envelope(QueryEnvelope),
}

impl DetectedQuery {
    pub fn envelope(&self) -> Option<&QueryEnvelope> {
        match self {
            DetectedQuery::Envelope(envelope) => Some(envelope),
            DetectedQuery::Plain(_) => None,
        }
    }
}

/// Whether `query` has the shape of a JSON envelope.
pub fn looks_like_envelope(query: &str) -> bool {
    let trimmed = query.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

/// Classify a placeholder-normalized bridge query.
///
/// Text shaped like an envelope must parse as a JSON object; there is no
/// fallback to plain mode.
pub fn detect(normalized: &str) -> Result<DetectedQuery> {
    if !looks_like_envelope(normalized) {
        return Ok(DetectedQuery::Plain(normalized.to_string()));
    }

    let fields: Map<String, Value> =
        serde_json::from_str(normalized.trim()).map_err(|e| BridgeError::MalformedEnvelope {
            query: normalized.to_string(),
            message: e.to_string(),
        })?;

    let envelope = QueryEnvelope { fields };
    debug!(
        "Detected query envelope of type {:?}",
        envelope.declared_type()
    );
    Ok(DetectedQuery::Envelope(envelope))
}
