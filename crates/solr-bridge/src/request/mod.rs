//! Outbound Solr select request building.
//!
//! Combines a parsed lucene query with pagination, field projection and sort
//! metadata into the ordered parameter set `q`, `rows`, `start`, `fl`,
//! `sort`, `wt`.

mod metadata;
mod order;

pub use metadata::RequestMetadata;
pub use order::{parse_order, SortDirection, SortField};

use crate::config::RequestConfig;
use crate::error::{BridgeError, Result};
use crate::qualification::ParsedQuery;
use url::Url;

/// Which bridge operation a request serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMethod {
    /// Only the number of matches is wanted.
    Count,
    /// Matching documents are wanted.
    Search,
}

impl QueryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMethod::Count => "count",
            QueryMethod::Search => "search",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "count" => Some(QueryMethod::Count),
            "search" => Some(QueryMethod::Search),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query parameters of a select request, in emission order.
///
/// Values are stored unencoded; encoding happens when rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    params: Vec<(&'static str, String)>,
}

impl BuiltRequest {
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Render as `name=value&...`, percent-encoding each value on its own.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full select URL for `structure` (the Solr core or collection) under `base_url`.
    pub fn to_url(&self, base_url: &str, structure: &str) -> Result<Url> {
        let url = format!(
            "{}/{}/{}?{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(structure),
            RequestConfig::SELECT_HANDLER,
            self.to_query_string()
        );
        Url::parse(&url).map_err(|e| BridgeError::Encoding {
            message: format!("{} ({})", e, url),
        })
    }
}

/// Drop the `_source.` prefix some bridge field names carry.
pub fn strip_structural_prefix(field: &str) -> &str {
    field
        .strip_prefix(RequestConfig::STRUCTURAL_PREFIX)
        .unwrap_or(field)
}

/// Build the select parameters for `method`.
///
/// Counts always get `rows=0` and never `start`, `fl` or `sort`. A blank
/// query becomes the match-all query.
pub fn build(
    method: QueryMethod,
    query: &ParsedQuery,
    metadata: &RequestMetadata,
) -> BuiltRequest {
    let mut params = Vec::with_capacity(6);

    let q = if query.is_blank() {
        RequestConfig::MATCH_ALL_QUERY.to_string()
    } else {
        query.as_str().to_string()
    };
    params.push(("q", q));

    match method {
        QueryMethod::Count => params.push(("rows", "0".to_string())),
        QueryMethod::Search => {
            params.push(("rows", metadata.effective_page_size().to_string()));
            params.push(("start", metadata.effective_offset().to_string()));

            if !metadata.fields.is_empty() {
                let fields = metadata
                    .fields
                    .iter()
                    .map(|field| strip_structural_prefix(field))
                    .collect::<Vec<_>>()
                    .join(",");
                params.push(("fl", fields));
            }

            if !metadata.order.is_empty() {
                let sort = metadata
                    .order
                    .iter()
                    .map(|key| {
                        format!(
                            "{}:{}",
                            strip_structural_prefix(&key.field),
                            key.direction.as_str()
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                params.push(("sort", sort));
            }
        }
    }

    params.push(("wt", RequestConfig::RESPONSE_WRITER.to_string()));
    BuiltRequest { params }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(request: &BuiltRequest) -> Vec<&'static str> {
        request.params().iter().map(|(name, _)| *name).collect()
    }

    #[test]
    fn test_count_request() {
        let meta = RequestMetadata::new()
            .with_page_size(10)
            .with_offset(20)
            .with_fields(["message"])
            .with_order("message:DESC");
        let request = build(QueryMethod::Count, &ParsedQuery::new("message:error"), &meta);

        assert_eq!(names(&request), vec!["q", "rows", "wt"]);
        assert_eq!(request.get("rows"), Some("0"));
        assert_eq!(
            request.to_query_string(),
            "q=message%3Aerror&rows=0&wt=json"
        );
    }

    #[test]
    fn test_search_defaults() {
        let request = build(
            QueryMethod::Search,
            &ParsedQuery::new("a:b"),
            &RequestMetadata::default(),
        );
        assert_eq!(names(&request), vec!["q", "rows", "start", "wt"]);
        assert_eq!(request.get("rows"), Some("1000"));
        assert_eq!(request.get("start"), Some("0"));
    }

    #[test]
    fn test_search_fields_and_sort() {
        let meta = RequestMetadata::new()
            .with_page_size(5)
            .with_offset(10)
            .with_fields(["_source.message", "_timestamp"])
            .with_order("_source._timestamp:DESC,message:ASC");
        let request = build(QueryMethod::Search, &ParsedQuery::new("a:b"), &meta);

        assert_eq!(names(&request), vec!["q", "rows", "start", "fl", "sort", "wt"]);
        assert_eq!(request.get("fl"), Some("message,_timestamp"));
        assert_eq!(request.get("sort"), Some("_timestamp:desc,message:asc"));
        assert_eq!(
            request.to_query_string(),
            "q=a%3Ab&rows=5&start=10&fl=message%2C_timestamp&sort=_timestamp%3Adesc%2Cmessage%3Aasc&wt=json"
        );
    }

    #[test]
    fn test_blank_query_matches_all() {
        let request = build(
            QueryMethod::Count,
            &ParsedQuery::new("  "),
            &RequestMetadata::default(),
        );
        assert_eq!(request.get("q"), Some("*:*"));
    }

    #[test]
    fn test_to_url() {
        let request = build(
            QueryMethod::Count,
            &ParsedQuery::new("message:error"),
            &RequestMetadata::default(),
        );
        let url = request
            .to_url("http://localhost:8983/solr/", "techproducts")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8983/solr/techproducts/select?q=message%3Aerror&rows=0&wt=json"
        );
    }

    #[test]
    fn test_to_url_invalid_base() {
        let request = build(
            QueryMethod::Count,
            &ParsedQuery::default(),
            &RequestMetadata::default(),
        );
        assert!(matches!(
            request.to_url("not a url", "core"),
            Err(BridgeError::Encoding { .. })
        ));
    }

    #[test]
    fn test_strip_structural_prefix() {
        assert_eq!(strip_structural_prefix("_source.message"), "message");
        assert_eq!(strip_structural_prefix("message"), "message");
        assert_eq!(strip_structural_prefix("a._source.b"), "a._source.b");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(QueryMethod::from_name("COUNT"), Some(QueryMethod::Count));
        assert_eq!(QueryMethod::from_name("retrieve"), None);
        assert_eq!(QueryMethod::Search.to_string(), "search");
    }
}
