//! Decoding source records from JSON.
//!
//! Two shapes are accepted:
//!
//! - **Harvested MARC-in-JSON**, as produced by converting MARCXML:
//!   `{"leader": "...", "controlfield": [{"tag": "001", "#text": "..."}],
//!   "datafield": [{"tag": "245", "ind1": "1", "ind2": "0",
//!   "subfield": [{"code": "a", "#text": "..."}]}]}`. Any list may collapse
//!   to a single object and keys may carry a namespace prefix (`marc:`).
//! - **MARCJSON**: an array whose first element is `{"leader": "..."}`,
//!   followed by `{tag: value}` control fields and
//!   `{tag: {"ind1", "ind2", "subfields": [{code: value}]}}` data fields.
//!
//! A missing or short leader is always a structural error. A tag that is
//! not three digits is one too in strict mode; otherwise the field is
//! skipped with a warning. Everything else degrades: a subfield without a
//! code or text is skipped.

use crate::error::{CrosswalkError, Result};
use crate::leader::Leader;
use crate::record::{is_control_tag, parse_tag, Field, SourceRecord};
use crate::selector::{get_prefixed, iterify};
use serde_json::Value;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

/// Namespace prefix used by harvested MARC-in-JSON keys.
pub const MARC_KEY_PREFIX: &str = "marc:";

/// Options for decoding.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// NFC-normalize every value.
    pub normalize_unicode: bool,
    /// Fail on malformed tags instead of skipping the field.
    pub strict: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            strict: true,
        }
    }
}

impl SourceRecord {
    /// Decode a record from either supported JSON shape.
    ///
    /// # Errors
    ///
    /// Returns a structural error if the document has no usable leader, a
    /// tag is not three digits, or the document is neither an object nor
    /// an array.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_crosswalk::SourceRecord;
    /// use serde_json::json;
    ///
    /// let doc = json!({
    ///     "leader": "01026cam a2200301 i 4500",
    ///     "controlfield": {"tag": "001", "#text": "000123"},
    ///     "datafield": [{
    ///         "tag": "245", "ind1": "1", "ind2": "0",
    ///         "subfield": [{"code": "a", "#text": "Annual report"}]
    ///     }]
    /// });
    /// let record = SourceRecord::from_json(&doc)?;
    /// assert_eq!(record.control_number(), Some("000123"));
    /// # Ok::<(), marc_crosswalk::CrosswalkError>(())
    /// ```
    pub fn from_json(doc: &Value) -> Result<Self> {
        Self::from_json_with(doc, DecodeOptions::default())
    }

    /// Decode a record with explicit options.
    ///
    /// # Errors
    ///
    /// See [`SourceRecord::from_json`].
    pub fn from_json_with(doc: &Value, options: DecodeOptions) -> Result<Self> {
        match doc {
            Value::Object(_) => decode_harvested(doc, options),
            Value::Array(items) => decode_marcjson(items, options),
            _ => Err(CrosswalkError::InvalidRecord(
                "Expected JSON object or array".to_string(),
            )),
        }
    }
}

fn normalize(value: &str, options: DecodeOptions) -> String {
    if options.normalize_unicode {
        value.nfc().collect()
    } else {
        value.to_string()
    }
}

fn first_char(value: Option<&Value>) -> char {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}

/// Text content of an element, which may be a bare string or `{"#text": ..}`.
fn text_of(node: &Value) -> Option<&str> {
    match node {
        Value::String(s) => Some(s.as_str()),
        Value::Object(_) => get_prefixed(node, "#text", MARC_KEY_PREFIX).and_then(Value::as_str),
        _ => None,
    }
}

/// Validate a tag; `Ok(false)` when a malformed tag should be skipped.
fn accept_tag(tag: &str, options: DecodeOptions) -> Result<bool> {
    match parse_tag(tag) {
        Ok(_) => Ok(true),
        Err(err) if options.strict => Err(err),
        Err(err) => {
            warn!(tag, error = %err, "skipping field with malformed tag");
            Ok(false)
        }
    }
}

fn checked_tag(node: &Value, options: DecodeOptions) -> Result<Option<String>> {
    let tag = get_prefixed(node, "tag", MARC_KEY_PREFIX)
        .and_then(Value::as_str)
        .unwrap_or_default();
    Ok(accept_tag(tag, options)?.then(|| tag.to_string()))
}

fn decode_harvested(doc: &Value, options: DecodeOptions) -> Result<SourceRecord> {
    let leader = get_prefixed(doc, "leader", MARC_KEY_PREFIX)
        .and_then(text_of)
        .ok_or_else(|| CrosswalkError::InvalidLeader("Missing leader".to_string()))?;
    let mut record = SourceRecord::new(Leader::parse(leader)?);

    if let Some(controls) = get_prefixed(doc, "controlfield", MARC_KEY_PREFIX) {
        for node in iterify(controls) {
            let Some(tag) = checked_tag(node, options)? else { continue };
            let value = text_of(node).unwrap_or_default();
            record.add_control_field(tag, normalize(value, options));
        }
    }

    if let Some(datafields) = get_prefixed(doc, "datafield", MARC_KEY_PREFIX) {
        for node in iterify(datafields) {
            let Some(tag) = checked_tag(node, options)? else { continue };
            let mut field = Field::new(
                tag,
                first_char(get_prefixed(node, "ind1", MARC_KEY_PREFIX)),
                first_char(get_prefixed(node, "ind2", MARC_KEY_PREFIX)),
            );
            let subfields = get_prefixed(node, "subfield", MARC_KEY_PREFIX).unwrap_or(&Value::Null);
            for sub in iterify(subfields) {
                let code = get_prefixed(sub, "code", MARC_KEY_PREFIX)
                    .and_then(Value::as_str)
                    .and_then(|c| c.chars().next());
                if let (Some(code), Some(text)) = (code, text_of(sub)) {
                    field.add_subfield(code, normalize(text, options));
                }
            }
            record.add_field(field);
        }
    }

    Ok(record)
}

fn decode_marcjson(items: &[Value], options: DecodeOptions) -> Result<SourceRecord> {
    let (head, rest) = items
        .split_first()
        .ok_or_else(|| CrosswalkError::InvalidRecord("Empty JSON array".to_string()))?;

    let leader = head
        .get("leader")
        .and_then(Value::as_str)
        .ok_or_else(|| CrosswalkError::InvalidLeader("Missing leader field".to_string()))?;
    let mut record = SourceRecord::new(Leader::parse(leader)?);

    for item in rest {
        let obj = item
            .as_object()
            .ok_or_else(|| CrosswalkError::InvalidRecord("Field must be object".to_string()))?;

        for (tag, value) in obj {
            if !accept_tag(tag, options)? {
                continue;
            }

            if is_control_tag(tag) {
                if let Some(text) = value.as_str() {
                    record.add_control_field(tag.clone(), normalize(text, options));
                }
                continue;
            }

            let mut field = Field::new(
                tag.clone(),
                first_char(value.get("ind1")),
                first_char(value.get("ind2")),
            );
            if let Some(subfields) = value.get("subfields") {
                for sub in iterify(subfields) {
                    let Some(map) = sub.as_object() else { continue };
                    for (code, text) in map {
                        if let (Some(code), Some(text)) = (code.chars().next(), text.as_str()) {
                            field.add_subfield(code, normalize(text, options));
                        }
                    }
                }
            }
            record.add_field(field);
        }
    }

    Ok(record)
}
