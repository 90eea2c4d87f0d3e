//! Structured-match DSL ("Kinetic DSL").
//!
//! The nested query is a JSON object mapping field names to match specs:
//!
//! ```json
//! {"message": {"value": "error", "matcher": "like"}, "level": {"value": "3"}}
//! ```
//!
//! Each spec becomes a `field:value` clause with wildcards added according to
//! its matcher; clauses are joined with the envelope's operator.

use super::envelope::QueryEnvelope;
use super::escape::escape_lucene;
use super::placeholder::{normalize_placeholders, substitute, ParameterMap, SubstitutionMode};
use super::DslInterpreter;
use crate::config::QueryConfig;
use crate::error::{BridgeError, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// How a field value is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Matcher {
    #[default]
    Exact,
    StartsWith,
    EndsWith,
    Like,
}

impl Matcher {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exact" => Some(Matcher::Exact),
            "startsWith" => Some(Matcher::StartsWith),
            "endsWith" => Some(Matcher::EndsWith),
            "like" => Some(Matcher::Like),
            _ => None,
        }
    }

    fn leading_wildcard(&self) -> bool {
        matches!(self, Matcher::EndsWith | Matcher::Like)
    }

    fn trailing_wildcard(&self) -> bool {
        matches!(self, Matcher::StartsWith | Matcher::Like)
    }

    /// Render `field:value`, escaping the value and adding this matcher's wildcards.
    ///
    /// Returns `None` when the value is empty.
    pub fn clause(&self, field: &str, value: &str) -> Option<String> {
        let escaped = escape_lucene(value)?;
        let mut clause = String::with_capacity(field.len() + escaped.len() + 3);
        clause.push_str(field);
        clause.push(':');
        if self.leading_wildcard() {
            clause.push('*');
        }
        clause.push_str(&escaped);
        if self.trailing_wildcard() {
            clause.push('*');
        }
        Some(clause)
    }
}

/// One entry of the structured query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: String,
    pub matcher: Matcher,
    pub value: String,
}

impl FieldMatch {
    fn from_json(field: &str, spec: &Value, fragment: &str) -> Result<Self> {
        let missing_value = || BridgeError::MissingFieldValue {
            field: field.to_string(),
            fragment: fragment.to_string(),
        };

        let spec = spec.as_object().ok_or_else(missing_value)?;

        let value = match spec.get(QueryConfig::VALUE_KEY) {
            None | Some(Value::Null) => return Err(missing_value()),
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            Some(Value::Bool(value)) => value.to_string(),
            Some(_) => {
                return Err(BridgeError::MalformedQuery {
                    fragment: fragment.to_string(),
                    message: format!("the value of the {} field must be a scalar", field),
                })
            }
        };

        let matcher = match spec.get(QueryConfig::MATCHER_KEY).and_then(Value::as_str) {
            None => Matcher::Exact,
            Some(name) => Matcher::from_name(name).unwrap_or_else(|| {
                warn!("Unknown matcher '{}' for field {}, using exact", name, field);
                Matcher::Exact
            }),
        };

        Ok(Self {
            field: field.to_string(),
            matcher,
            value,
        })
    }
}

/// Options read from the envelope around a structured query.
#[derive(Debug, Clone, Default)]
pub struct KineticOptions<'a> {
    pub query_prefix: Option<&'a str>,
    pub whitelisted_fields: Option<Vec<&'a str>>,
    pub concatenating_operator: Option<&'a str>,
}

impl<'a> KineticOptions<'a> {
    pub fn from_envelope(envelope: &'a QueryEnvelope) -> Self {
        Self {
            query_prefix: envelope.query_prefix(),
            whitelisted_fields: envelope.whitelisted_fields(),
            concatenating_operator: Some(envelope.concatenating_operator()),
        }
    }

    fn allows(&self, field: &str) -> bool {
        self.whitelisted_fields
            .as_ref()
            .map_or(true, |fields| fields.contains(&field))
    }
}

/// Translate a structured query into lucene syntax.
///
/// Parameters are substituted verbatim before parsing; each value is escaped
/// once its field is known.
pub fn build_kinetic_query(
    query: &str,
    options: &KineticOptions<'_>,
    parameters: Option<&ParameterMap>,
) -> Result<String> {
    if query.trim().is_empty() {
        return Err(BridgeError::MalformedQuery {
            fragment: query.to_string(),
            message: "the Kinetic DSL query was not specified or was blank".to_string(),
        });
    }

    let expanded = substitute(
        &normalize_placeholders(query),
        parameters,
        SubstitutionMode::Verbatim,
    )?;

    let matches: Map<String, Value> =
        serde_json::from_str(&expanded).map_err(|e| BridgeError::MalformedQuery {
            fragment: expanded.clone(),
            message: e.to_string(),
        })?;

    let mut clauses = Vec::with_capacity(matches.len());
    for (field, spec) in &matches {
        if !options.allows(field) {
            debug!("Skipping field {} not in the whitelist", field);
            continue;
        }
        let field_match = FieldMatch::from_json(field, spec, &expanded)?;
        if let Some(clause) = field_match.matcher.clause(&field_match.field, &field_match.value) {
            clauses.push(clause);
        }
    }

    if clauses.is_empty() {
        return Err(BridgeError::EmptyQuery { fragment: expanded });
    }

    let operator = options
        .concatenating_operator
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .unwrap_or(QueryConfig::DEFAULT_CONCATENATING_OPERATOR);

    let mut lucene = options.query_prefix.unwrap_or_default().to_string();
    lucene.push_str(&clauses.join(&format!(" {} ", operator)));
    Ok(lucene)
}

/// Interpreter for envelopes declaring the Kinetic DSL.
#[derive(Debug, Clone, Copy, Default)]
pub struct KineticInterpreter;

impl DslInterpreter for KineticInterpreter {
    fn interpret(
        &self,
        envelope: &QueryEnvelope,
        parameters: Option<&ParameterMap>,
    ) -> Result<String> {
        let query = envelope.query().unwrap_or_default();
        build_kinetic_query(&query, &KineticOptions::from_envelope(envelope), parameters)
    }
}
