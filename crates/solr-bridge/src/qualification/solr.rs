//! Raw-fragment DSL ("Solr DSL") and plain lucene templates.
//!
//! The fragment is passed through untouched apart from parameter
//! substitution. Its lucene syntax is not validated.

use super::envelope::QueryEnvelope;
use super::placeholder::{substitute, ParameterMap, SubstitutionMode};
use super::DslInterpreter;
use crate::error::{BridgeError, Result};

/// Substitute Lucene-escaped parameters into a raw fragment.
///
/// When `is_json_query` is set the fragment is a JSON payload, so each value
/// is additionally escaped for a JSON string literal.
pub fn build_solr_query(
    is_json_query: bool,
    fragment: &str,
    parameters: Option<&ParameterMap>,
) -> Result<String> {
    let mode = if is_json_query {
        SubstitutionMode::LuceneInJson
    } else {
        SubstitutionMode::Lucene
    };
    substitute(fragment, parameters, mode)
}

/// Interpreter for envelopes declaring the Solr DSL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolrInterpreter;

impl DslInterpreter for SolrInterpreter {
    fn interpret(
        &self,
        envelope: &QueryEnvelope,
        parameters: Option<&ParameterMap>,
    ) -> Result<String> {
        let fragment = envelope
            .query()
            .filter(|query| !query.trim().is_empty())
            .ok_or_else(|| BridgeError::MalformedQuery {
                fragment: String::new(),
                message: "the Solr DSL query was not specified or was blank".to_string(),
            })?;
        build_solr_query(true, &fragment, parameters)
    }
}
