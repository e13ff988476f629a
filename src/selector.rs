//! Path-based read access into nested JSON documents.
//!
//! Harvested source documents are loosely shaped: a property may be a scalar
//! in one record and a list in the next, and any level may be missing. The
//! functions here read such documents without ever failing on absence.
//!
//! Paths are slash-delimited. A segment addresses an object key, or, when
//! the current node is an array, a numeric index.
//!
//! ```
//! use marc_crosswalk::selector::{exists, get, iterify};
//! use serde_json::json;
//!
//! let doc = json!({"sourceResource": {"spatial": ["Asheville", "Buncombe"]}});
//!
//! assert!(exists(&doc, "sourceResource/spatial/1"));
//! assert_eq!(get(&doc, "sourceResource/spatial/0"), Some(&json!("Asheville")));
//! assert_eq!(get(&doc, "sourceResource/date"), None);
//! assert_eq!(iterify(&json!("one")).len(), 1);
//! ```

use serde_json::Value;

/// Whether a value exists at `path`.
#[must_use]
pub fn exists(doc: &Value, path: &str) -> bool {
    get(doc, path).is_some()
}

/// The value at `path`, or `None` if any segment is absent.
///
/// An empty path addresses the document itself.
#[must_use]
pub fn get<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(doc, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// The value at `path`, or `default` if any segment is absent.
#[must_use]
pub fn get_or<'a>(doc: &'a Value, path: &str, default: &'a Value) -> &'a Value {
    get(doc, path).unwrap_or(default)
}

/// The string at `path`, if present and a string.
#[must_use]
pub fn get_str<'a>(doc: &'a Value, path: &str) -> Option<&'a str> {
    get(doc, path).and_then(Value::as_str)
}

/// View a scalar-or-list value as a list.
///
/// Arrays are returned element by element; `null` yields nothing; any other
/// value yields itself as a single element.
#[must_use]
pub fn iterify(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Look up `key` in an object, also accepting a namespace-prefixed form.
///
/// Harvested MARC-in-JSON sometimes carries keys like `marc:datafield`.
/// The bare key wins when both are present.
#[must_use]
pub fn get_prefixed<'a>(doc: &'a Value, key: &str, prefix: &str) -> Option<&'a Value> {
    let map = doc.as_object()?;
    map.get(key)
        .or_else(|| map.get(format!("{prefix}{key}").as_str()))
}
