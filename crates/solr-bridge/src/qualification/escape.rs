//! Lucene and JSON escaping for parameter values.

use regex::Regex;
use std::sync::LazyLock;

/// Characters with meaning in the Lucene classic query parser, plus whitespace.
///
/// `&` and `|` only matter doubled, so they are handled by [`DOUBLE_OPERATORS`].
static RESERVED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([*+\-=~><"?^${}():!/\[\]\\]|\s)"#).unwrap());

static DOUBLE_OPERATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\|\||&&)").unwrap());

static BOOLEAN_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(AND|OR|NOT)\b").unwrap());

/// Escape a parameter value so Lucene reads it as a single literal term.
///
/// Returns `None` for an empty value; callers omit the term instead of
/// inserting anything.
///
/// - `a:b` → `a\:b`
/// - `A&&B` → `A\&&B`
/// - `cats OR dogs` → `cats\ \O\R\ dogs`
pub fn escape_lucene(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    let escaped = RESERVED_CHARS.replace_all(value, r"\$1");
    // Runs after the single character pass so the backslash it adds is never escaped again.
    let escaped = DOUBLE_OPERATORS.replace_all(&escaped, r"\$1");
    let escaped = BOOLEAN_KEYWORDS.replace_all(&escaped, |caps: &regex::Captures<'_>| {
        caps[1].chars().map(|c| format!("\\{}", c)).collect::<String>()
    });

    Some(escaped.into_owned())
}

/// Escape a string for use inside a JSON string literal, without the surrounding quotes.
pub fn escape_json_scalar(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_term() {
        assert_eq!(escape_lucene("error").as_deref(), Some("error"));
        assert_eq!(escape_lucene("Oregon").as_deref(), Some("Oregon"));
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape_lucene(""), None);
    }

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(escape_lucene("a:b").as_deref(), Some(r"a\:b"));
        assert_eq!(escape_lucene("(1+1)").as_deref(), Some(r"\(1\+1\)"));
        assert_eq!(escape_lucene("path/to").as_deref(), Some(r"path\/to"));
        assert_eq!(escape_lucene(r"back\slash").as_deref(), Some(r"back\\slash"));
        assert_eq!(escape_lucene("[a TO b]").as_deref(), Some(r"\[a\ TO\ b\]"));
        assert_eq!(
            escape_lucene(r#"-"x"~2^3*?!{}=<>"#).as_deref(),
            Some(r#"\-\"x\"\~2\^3\*\?\!\{\}\=\<\>"#)
        );
    }

    #[test]
    fn test_escape_whitespace() {
        assert_eq!(escape_lucene("a b\tc").as_deref(), Some("a\\ b\\\tc"));
    }

    #[test]
    fn test_escape_double_operators_once() {
        assert_eq!(escape_lucene("A&&B").as_deref(), Some(r"A\&&B"));
        assert_eq!(escape_lucene("A||B").as_deref(), Some(r"A\||B"));
        // Single characters are not operators.
        assert_eq!(escape_lucene("A&B|C").as_deref(), Some("A&B|C"));
    }

    #[test]
    fn test_escape_boolean_keywords() {
        assert_eq!(escape_lucene("AND").as_deref(), Some(r"\A\N\D"));
        assert_eq!(escape_lucene("NOT").as_deref(), Some(r"\N\O\T"));
        assert_eq!(
            escape_lucene("cats OR dogs").as_deref(),
            Some(r"cats\ \O\R\ dogs")
        );
        // Only whole words are keywords.
        assert_eq!(escape_lucene("ORANGE").as_deref(), Some("ORANGE"));
        assert_eq!(escape_lucene("and").as_deref(), Some("and"));
    }

    #[test]
    fn test_escaping_twice_differs() {
        let once = escape_lucene("A&&B").unwrap();
        let twice = escape_lucene(&once).unwrap();
        assert_ne!(once, twice);
        assert_eq!(twice, r"A\\\&&B");
    }

    #[test]
    fn test_escape_json_scalar() {
        assert_eq!(escape_json_scalar("plain"), "plain");
        assert_eq!(escape_json_scalar(r#"a"b"#), r#"a\"b"#);
        assert_eq!(escape_json_scalar(r"a\b"), r"a\\b");
        assert_eq!(escape_json_scalar("line\nbreak"), r"line\nbreak");
    }
}
