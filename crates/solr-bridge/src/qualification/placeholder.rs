//! Parameter placeholder normalization and substitution.
//!
//! A placeholder looks like `<%= parameter["name"] %>`. Single quotes are
//! accepted in place of the double quotes, and whitespace inside the tag is
//! optional.

use super::escape::{escape_json_scalar, escape_lucene};
use crate::error::{BridgeError, Result};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

/// Caller supplied parameter values, keyed by parameter name.
pub type ParameterMap = HashMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<%=\s*parameter\[\s*(?:"(.*?)"|'(.*?)')\s*\]\s*%>"#).unwrap()
});

/// How a parameter value is transformed before it replaces its placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionMode {
    /// Inserted as-is. Only for text that is parsed as JSON afterwards.
    Verbatim,
    /// Lucene escaped.
    Lucene,
    /// Lucene escaped, then escaped again for a JSON string literal.
    LuceneInJson,
}

impl SubstitutionMode {
    fn apply<'a>(self, value: &'a str) -> Cow<'a, str> {
        match self {
            SubstitutionMode::Verbatim => Cow::Borrowed(value),
            SubstitutionMode::Lucene => Cow::Owned(escape_lucene(value).unwrap_or_default()),
            SubstitutionMode::LuceneInJson => {
                let escaped = escape_lucene(value).unwrap_or_default();
                Cow::Owned(escape_json_scalar(&escaped))
            }
        }
    }
}

fn placeholder_name<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Rewrite every placeholder into the canonical single-quoted form.
///
/// `<%= parameter["x"] %>` becomes `<%= parameter['x'] %>`, so a template
/// embedded in a JSON string literal no longer contains bare double quotes.
pub fn normalize_placeholders(text: &str) -> Cow<'_, str> {
    PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        format!("<%= parameter['{}'] %>", placeholder_name(caps))
    })
}

/// Whether `text` references any parameter.
pub fn has_placeholders(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Names of all referenced parameters, in order of appearance.
pub fn referenced_parameters(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| placeholder_name(&caps).to_string())
        .collect()
}

/// Replace every placeholder in `text` with its parameter value.
///
/// Fails on the first placeholder whose parameter is missing, or on the
/// first placeholder at all when `parameters` is `None`.
pub fn substitute(
    text: &str,
    parameters: Option<&ParameterMap>,
    mode: SubstitutionMode,
) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let name = placeholder_name(&caps);

        let parameters = parameters.ok_or_else(|| BridgeError::no_parameters(name))?;
        let value = parameters
            .get(name)
            .ok_or_else(|| BridgeError::missing_parameter(name))?;

        result.push_str(&text[last..whole.start()]);
        result.push_str(&mode.apply(value));
        last = whole.end();
    }
    result.push_str(&text[last..]);

    trace!("Substituted parameters ({:?}): {}", mode, result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParameterMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_double_quotes() {
        assert_eq!(
            normalize_placeholders(r#"message:<%= parameter["log level"] %>"#),
            "message:<%= parameter['log level'] %>"
        );
        assert_eq!(
            normalize_placeholders(r#"a:<%=parameter[ "x" ]%> b:<%= parameter['y'] %>"#),
            "a:<%= parameter['x'] %> b:<%= parameter['y'] %>"
        );
    }

    #[test]
    fn test_normalize_leaves_plain_text() {
        let text = "message:error AND level:warn";
        assert!(matches!(normalize_placeholders(text), Cow::Borrowed(_)));
        assert!(!has_placeholders(text));
    }

    #[test]
    fn test_referenced_parameters() {
        let text = r#"<%= parameter["a"] %> OR <%= parameter['b c'] %>"#;
        assert_eq!(referenced_parameters(text), vec!["a", "b c"]);
    }

    #[test]
    fn test_substitute_verbatim() {
        let result = substitute(
            "<%= parameter['q'] %>",
            Some(&params(&[("q", r#"{"a": {"value": "x y"}}"#)])),
            SubstitutionMode::Verbatim,
        )
        .unwrap();
        assert_eq!(result, r#"{"a": {"value": "x y"}}"#);
    }

    #[test]
    fn test_substitute_lucene() {
        let result = substitute(
            r#"title:<%= parameter["t"] %> AND id:<%= parameter['id'] %>"#,
            Some(&params(&[("t", "a b"), ("id", "1:2")])),
            SubstitutionMode::Lucene,
        )
        .unwrap();
        assert_eq!(result, r"title:a\ b AND id:1\:2");
    }

    #[test]
    fn test_substitute_lucene_in_json() {
        let result = substitute(
            "message:<%= parameter['m'] %>",
            Some(&params(&[("m", "say \"hi\"")])),
            SubstitutionMode::LuceneInJson,
        )
        .unwrap();
        // Lucene: say\ \"hi\"  then JSON doubles each backslash and escapes the quotes.
        assert_eq!(result, r#"message:say\\ \\\"hi\\\""#);
    }

    #[test]
    fn test_substitute_empty_value() {
        let result = substitute(
            "a:<%= parameter['x'] %>",
            Some(&params(&[("x", "")])),
            SubstitutionMode::Lucene,
        )
        .unwrap();
        assert_eq!(result, "a:");
    }

    #[test]
    fn test_missing_parameter() {
        let err = substitute(
            "a:<%= parameter['x'] %>",
            Some(&params(&[("y", "1")])),
            SubstitutionMode::Lucene,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingParameter { ref name, no_parameters: false } if name == "x"
        ));
    }

    #[test]
    fn test_no_parameter_map() {
        let err = substitute("a:<%= parameter['x'] %>", None, SubstitutionMode::Lucene)
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingParameter { no_parameters: true, .. }
        ));

        // Without placeholders a missing map is fine.
        assert_eq!(
            substitute("a:b", None, SubstitutionMode::Lucene).unwrap(),
            "a:b"
        );
    }
}
