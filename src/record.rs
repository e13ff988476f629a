//! Source record structures.
//!
//! This module provides the record types the crosswalk reads from:
//! - [`SourceRecord`] — leader, control fields and repeatable data fields
//! - [`Field`] — one instance of a data field (010+)
//! - [`Subfield`] — a coded value within a field
//! - [`FieldInstance`] — a borrowed view over either kind of field, as handed
//!   to rule handlers
//!
//! # Examples
//!
//! ```
//! use marc_crosswalk::{Field, Leader, SourceRecord};
//!
//! let record = SourceRecord::builder(Leader::default())
//!     .control_field_str("001", "12345")
//!     .field(
//!         Field::builder("245", '1', '0')
//!             .subfield_str('a', "Annual report")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.control_number(), Some("12345"));
//! assert_eq!(record.fields_by_tag("245").count(), 1);
//! ```

use crate::error::{CrosswalkError, Result};
use crate::leader::Leader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Tag of the record control number.
pub const CONTROL_NUMBER_TAG: &str = "001";

/// Tag of the fixed-length data elements control field.
pub const FIXED_DATA_TAG: &str = "008";

/// A MARC source record.
///
/// Fields are stored in insertion order using `IndexMap`; within a tag the
/// repeated instances keep their source order, and within an instance the
/// subfields keep theirs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Record leader (24 characters)
    pub leader: Leader,
    /// Control fields (001-009) - tag -> value
    pub control_fields: IndexMap<String, String>,
    /// Data fields (010+) - tag -> instances
    pub fields: IndexMap<String, Vec<Field>>,
}

/// A data field in a source record (fields 010 and higher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 digits)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields in source order
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

/// Borrowed view of one field instance, control or data.
#[derive(Debug, Clone, Copy)]
pub enum FieldInstance<'a> {
    /// A control field's whole value.
    Control(&'a str),
    /// A data field with its subfields.
    Data(&'a Field),
}

impl<'a> FieldInstance<'a> {
    /// The subfields of a data field; empty for control fields.
    #[must_use]
    pub fn subfields(&self) -> &'a [Subfield] {
        match self {
            FieldInstance::Control(_) => &[],
            FieldInstance::Data(field) => &field.subfields,
        }
    }
}

/// Parse a tag as a three-digit numeric code.
///
/// # Errors
///
/// Returns [`CrosswalkError::InvalidTag`] unless the tag is exactly three
/// ASCII digits.
pub fn parse_tag(tag: &str) -> Result<u16> {
    if tag.len() != 3 || !tag.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrosswalkError::InvalidTag(format!(
            "Tag must be three digits, got '{tag}'"
        )));
    }
    tag.parse::<u16>()
        .map_err(|_| CrosswalkError::InvalidTag(format!("Unparseable tag '{tag}'")))
}

/// Whether a tag names a control field (001-009).
#[must_use]
pub fn is_control_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.starts_with("00")
}

impl SourceRecord {
    /// Create a new record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        SourceRecord {
            leader,
            control_fields: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    /// Create a builder for fluently constructing records
    #[must_use]
    pub fn builder(leader: Leader) -> SourceRecordBuilder {
        SourceRecordBuilder {
            record: SourceRecord::new(leader),
        }
    }

    /// Add a control field (001-009)
    pub fn add_control_field(&mut self, tag: String, value: String) {
        self.control_fields.insert(tag, value);
    }

    /// Add a control field using string slices
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// Get a control field value
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields.get(tag).map(String::as_str)
    }

    /// Add a data field
    pub fn add_field(&mut self, field: Field) {
        self.fields
            .entry(field.tag.clone())
            .or_default()
            .push(field);
    }

    /// Iterate over fields matching a specific tag
    pub fn fields_by_tag(&self, tag: &str) -> impl Iterator<Item = &Field> {
        self.fields.get(tag).map(|v| v.iter()).into_iter().flatten()
    }

    /// Iterate over every tag group, data fields first, then control fields.
    ///
    /// Each item pairs a tag with its instances in source order. This is the
    /// traversal order the mapping engine dispatches in.
    pub fn tag_groups(&self) -> impl Iterator<Item = (&str, Vec<FieldInstance<'_>>)> {
        let data = self.fields.iter().map(|(tag, fields)| {
            (
                tag.as_str(),
                fields.iter().map(FieldInstance::Data).collect::<Vec<_>>(),
            )
        });
        let control = self
            .control_fields
            .iter()
            .map(|(tag, value)| (tag.as_str(), vec![FieldInstance::Control(value.as_str())]));
        data.chain(control)
    }

    /// The record control number (001), trimmed, if present and non-empty.
    #[must_use]
    pub fn control_number(&self) -> Option<&str> {
        self.get_control_field(CONTROL_NUMBER_TAG)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Character at a position of the 008 fixed-length data field.
    #[must_use]
    pub fn fixed_data_position(&self, index: usize) -> Option<char> {
        self.get_control_field(FIXED_DATA_TAG)
            .and_then(|value| value.chars().nth(index))
    }
}

impl Field {
    /// Create a new data field
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for a data field
    #[must_use]
    pub fn builder(tag: &str, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag.to_string(), indicator1, indicator2),
        }
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Get first value of a subfield
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.value.as_str())
    }

    /// Iterate over all values of a subfield code, in source order
    pub fn subfields_by_code(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |s| s.code == code)
            .map(|s| s.value.as_str())
    }
}

/// Builder for [`SourceRecord`]
#[derive(Debug)]
pub struct SourceRecordBuilder {
    record: SourceRecord,
}

impl SourceRecordBuilder {
    /// Add a control field
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> SourceRecord {
        self.record
    }
}

/// Builder for [`Field`]
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield(code, value.to_string());
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}
