//! Flattening Solr documents into bridge records.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// One result row: flattened field name to string value.
pub type Record = BTreeMap<String, String>;

/// Records returned by a search, with the field list and summary metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordList {
    pub fields: Vec<String>,
    pub records: Vec<Record>,
    pub metadata: BTreeMap<String, String>,
}

impl RecordList {
    /// Build a list, using `requested_fields` when given and otherwise every
    /// field present in the records, in first-seen order.
    pub fn new(records: Vec<Record>, requested_fields: &[String]) -> Self {
        let fields = if requested_fields.is_empty() {
            let mut seen = HashSet::new();
            records
                .iter()
                .flat_map(|record| record.keys())
                .filter(|key| seen.insert(key.as_str()))
                .cloned()
                .collect()
        } else {
            requested_fields.to_vec()
        };

        let mut metadata = BTreeMap::new();
        metadata.insert("count".to_string(), records.len().to_string());
        metadata.insert("size".to_string(), records.len().to_string());

        Self {
            fields,
            records,
            metadata,
        }
    }
}

fn flatten_into(value: &Value, prefix: &str, record: &mut Record) {
    let key = |segment: &str| {
        if prefix.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", prefix, segment)
        }
    };

    match value {
        Value::Object(object) => {
            for (name, child) in object {
                flatten_into(child, &key(name), record);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, &key(&index.to_string()), record);
            }
        }
        Value::String(text) => {
            record.insert(prefix.to_string(), text.clone());
        }
        Value::Number(number) => {
            record.insert(prefix.to_string(), number.to_string());
        }
        Value::Bool(_) | Value::Null => {}
    }
}

/// Flatten a document: string and number leaves keyed by dotted path.
pub fn flatten_document(document: &Value) -> Record {
    let mut record = Record::new();
    if document.is_object() {
        flatten_into(document, "", &mut record);
    }
    record
}

/// The nodes of `document` that hold records.
///
/// Without a root path that is the document itself. A root path is followed
/// segment by segment (numeric segments index arrays); an array at the end
/// yields each of its objects.
pub fn record_nodes<'a>(document: &'a Value, root_path: Option<&str>) -> Vec<&'a Value> {
    let Some(path) = root_path else {
        return vec![document];
    };

    let mut node = document;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let next = match node {
            Value::Object(object) => object.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(next) => node = next,
            None => return Vec::new(),
        }
    }

    match node {
        Value::Array(items) => items.iter().filter(|item| item.is_object()).collect(),
        Value::Object(_) => vec![node],
        _ => Vec::new(),
    }
}

/// Flatten every record found in `documents`.
pub fn map_documents(documents: &[Value], root_path: Option<&str>) -> Vec<Record> {
    documents
        .iter()
        .flat_map(|document| record_nodes(document, root_path))
        .map(flatten_document)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_scalars() {
        let record = flatten_document(&json!({
            "id": "1",
            "count": 3,
            "score": 1.5,
            "active": true,
            "missing": null
        }));
        assert_eq!(record.len(), 3);
        assert_eq!(record["id"], "1");
        assert_eq!(record["count"], "3");
        assert_eq!(record["score"], "1.5");
    }

    #[test]
    fn test_flatten_nested() {
        let record = flatten_document(&json!({
            "author": {"name": "Ada", "address": {"city": "London"}},
            "tags": ["a", "b"]
        }));
        assert_eq!(record["author.name"], "Ada");
        assert_eq!(record["author.address.city"], "London");
        assert_eq!(record["tags.0"], "a");
        assert_eq!(record["tags.1"], "b");
    }

    #[test]
    fn test_record_nodes_root_path() {
        let document = json!({"payload": {"items": [{"a": "1"}, {"a": "2"}, "skip"]}});
        assert_eq!(record_nodes(&document, None).len(), 1);
        assert_eq!(record_nodes(&document, Some("payload.items")).len(), 2);
        assert_eq!(
            record_nodes(&document, Some("payload.items.1")),
            vec![&json!({"a": "2"})]
        );
        assert!(record_nodes(&document, Some("payload.missing")).is_empty());
    }

    #[test]
    fn test_record_list_fields() {
        let records = map_documents(
            &[json!({"b": "1", "a": "2"}), json!({"c": "3", "a": "4"})],
            None,
        );
        let list = RecordList::new(records.clone(), &[]);
        assert_eq!(list.fields, vec!["a", "b", "c"]);
        assert_eq!(list.metadata["count"], "2");
        assert_eq!(list.metadata["size"], "2");

        let list = RecordList::new(records, &["c".to_string()]);
        assert_eq!(list.fields, vec!["c"]);
    }
}
