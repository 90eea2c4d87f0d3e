//! Request metadata: pagination, sort order and field projection.

use super::order::{parse_order, SortField};
use crate::config::RequestConfig;
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pagination, sort and projection settings for one bridge request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    /// Rows per page; `None` or `0` means the default.
    #[serde(default)]
    pub page_size: Option<u64>,
    /// Rows to skip.
    #[serde(default)]
    pub offset: Option<u64>,
    /// Sort keys, most significant first.
    #[serde(default)]
    pub order: Vec<SortField>,
    /// Fields to return; empty means all.
    #[serde(default)]
    pub fields: Vec<String>,
}

fn non_blank<'a>(metadata: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_count(metadata: &HashMap<String, String>, key: &str) -> Result<Option<u64>> {
    non_blank(metadata, key)
        .map(|value| {
            value.parse::<u64>().map_err(|e| BridgeError::InvalidMetadata {
                key: key.to_string(),
                value: value.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

impl RequestMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the raw string metadata a bridge request carries.
    ///
    /// Understands `pageSize`, `offset`, `order` and the 1-based legacy
    /// `pageNumber`, which only applies when no `offset` is given.
    pub fn from_bridge_metadata(
        metadata: &HashMap<String, String>,
        fields: Vec<String>,
    ) -> Result<Self> {
        let page_size = parse_count(metadata, RequestConfig::PAGE_SIZE_KEY)?;
        let mut offset = parse_count(metadata, RequestConfig::OFFSET_KEY)?;

        if offset.is_none() {
            if let Some(page_number) = parse_count(metadata, RequestConfig::PAGE_NUMBER_KEY)? {
                let size = Self::resolve_page_size(page_size);
                offset = Some(page_number.saturating_sub(1).saturating_mul(size));
            }
        }

        let order = non_blank(metadata, RequestConfig::ORDER_KEY)
            .map(parse_order)
            .unwrap_or_default();

        Ok(Self {
            page_size,
            offset,
            order,
            fields,
        })
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the sort keys from order metadata text.
    pub fn with_order(mut self, order: &str) -> Self {
        self.order = parse_order(order);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    fn resolve_page_size(page_size: Option<u64>) -> u64 {
        match page_size {
            None | Some(0) => RequestConfig::DEFAULT_PAGE_SIZE,
            Some(size) => size,
        }
    }

    /// Rows per page, with `0` treated as unset.
    pub fn effective_page_size(&self) -> u64 {
        Self::resolve_page_size(self.page_size)
    }

    pub fn effective_offset(&self) -> u64 {
        self.offset.unwrap_or(RequestConfig::DEFAULT_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let meta = RequestMetadata::default();
        assert_eq!(meta.effective_page_size(), 1000);
        assert_eq!(meta.effective_offset(), 0);
    }

    #[test]
    fn test_zero_page_size_uses_default() {
        let meta = RequestMetadata::new().with_page_size(0);
        assert_eq!(meta.effective_page_size(), 1000);

        let meta = RequestMetadata::from_bridge_metadata(&metadata(&[("pageSize", "0")]), vec![])
            .unwrap();
        assert_eq!(meta.effective_page_size(), 1000);
    }

    #[test]
    fn test_from_bridge_metadata() {
        let meta = RequestMetadata::from_bridge_metadata(
            &metadata(&[
                ("pageSize", "25"),
                ("offset", "50"),
                ("order", "_timestamp:DESC"),
            ]),
            vec!["message".to_string()],
        )
        .unwrap();
        assert_eq!(meta.page_size, Some(25));
        assert_eq!(meta.offset, Some(50));
        assert_eq!(meta.order, vec![SortField::desc("_timestamp")]);
        assert_eq!(meta.fields, vec!["message"]);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let meta = RequestMetadata::from_bridge_metadata(
            &metadata(&[("pageSize", " "), ("offset", ""), ("order", "")]),
            vec![],
        )
        .unwrap();
        assert_eq!(meta, RequestMetadata::default());
    }

    #[test]
    fn test_page_number() {
        let meta = RequestMetadata::from_bridge_metadata(
            &metadata(&[("pageSize", "20"), ("pageNumber", "3")]),
            vec![],
        )
        .unwrap();
        assert_eq!(meta.effective_offset(), 40);

        // An explicit offset wins.
        let meta = RequestMetadata::from_bridge_metadata(
            &metadata(&[("pageNumber", "3"), ("offset", "5")]),
            vec![],
        )
        .unwrap();
        assert_eq!(meta.effective_offset(), 5);
    }

    #[test]
    fn test_invalid_number() {
        let err = RequestMetadata::from_bridge_metadata(&metadata(&[("offset", "-1")]), vec![])
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::InvalidMetadata { ref key, .. } if key == "offset"
        ));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let meta: RequestMetadata = serde_json::from_str(
            r#"{"pageSize": 10, "order": [{"field": "a", "direction": "desc"}], "fields": ["a"]}"#,
        )
        .unwrap();
        assert_eq!(meta.page_size, Some(10));
        assert_eq!(meta.offset, None);
        assert_eq!(meta.order, vec![SortField::desc("a")]);
    }
}
