//! Sort order metadata parsing.
//!
//! Order metadata is a comma separated list of `field:DIR` entries. The field
//! may also be written as a bridge field reference, `<%=field["name"]%>:DESC`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FIELD_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<%=\s*field\[\s*(?:"(.*?)"|'(.*?)')\s*\]\s*%>(?:\s*:\s*(\w+))?$"#).unwrap()
});

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `ASC`/`DESC`, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if name.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

fn parse_entry(entry: &str) -> SortField {
    if let Some(caps) = FIELD_REFERENCE.captures(entry) {
        let field = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        let direction = caps
            .get(3)
            .and_then(|m| SortDirection::from_name(m.as_str()))
            .unwrap_or_default();
        return SortField::new(field, direction);
    }

    match entry.rsplit_once(':') {
        Some((field, direction)) => match SortDirection::from_name(direction.trim()) {
            Some(direction) => SortField::new(field.trim(), direction),
            None => SortField::asc(entry),
        },
        None => SortField::asc(entry),
    }
}

/// Parse order metadata into sort keys, in the order given.
pub fn parse_order(order: &str) -> Vec<SortField> {
    order
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}
