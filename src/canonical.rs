//! The canonical item schema every provider maps into.
//!
//! A [`CanonicalRecord`] has a top-level identity section (`id`, `@id`,
//! `dataProvider`, `isShownAt`) and a nested descriptive section,
//! [`SourceResource`]. It serializes to the JSON shape downstream consumers
//! expect, with empty properties omitted.
//!
//! Descriptive properties are lenient on input: a scalar where a list is
//! expected is read as a one-element list, and subjects may be bare strings
//! or `{"name": ...}` objects. This lets the enrichment stage run over
//! records that did not come from the mapping engine.

use crate::date::{DateInput, DateRange};
use crate::location::{PlaceRecord, SpatialValue};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical properties a rule handler can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    /// `sourceResource/title`
    Title,
    /// `sourceResource/creator`
    Creator,
    /// `sourceResource/contributor`
    Contributor,
    /// `sourceResource/publisher`
    Publisher,
    /// `sourceResource/date`
    Date,
    /// `sourceResource/extent`
    Extent,
    /// `sourceResource/identifier`
    Identifier,
    /// `sourceResource/rights`
    Rights,
    /// `sourceResource/subject`
    Subject,
    /// `sourceResource/temporal`
    Temporal,
    /// `sourceResource/description`
    Description,
    /// `sourceResource/format`
    Format,
    /// `sourceResource/language`
    Language,
    /// `sourceResource/spatial`
    Spatial,
    /// `sourceResource/relation`
    Relation,
    /// `sourceResource/type`
    Type,
    /// `isShownAt`
    IsShownAt,
}

impl Property {
    /// The property's name in the canonical schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Property::Title => "title",
            Property::Creator => "creator",
            Property::Contributor => "contributor",
            Property::Publisher => "publisher",
            Property::Date => "date",
            Property::Extent => "extent",
            Property::Identifier => "identifier",
            Property::Rights => "rights",
            Property::Subject => "subject",
            Property::Temporal => "temporal",
            Property::Description => "description",
            Property::Format => "format",
            Property::Language => "language",
            Property::Spatial => "spatial",
            Property::Relation => "relation",
            Property::Type => "type",
            Property::IsShownAt => "isShownAt",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `{"name": ...}` value, as used for subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NamedValueRepr")]
pub struct NamedValue {
    /// The value.
    pub name: String,
}

impl NamedValue {
    /// Wrap a string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        NamedValue { name: name.into() }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedValueRepr {
    Object { name: String },
    Bare(String),
}

impl From<NamedValueRepr> for NamedValue {
    fn from(repr: NamedValueRepr) -> Self {
        match repr {
            NamedValueRepr::Object { name } | NamedValueRepr::Bare(name) => NamedValue { name },
        }
    }
}

/// A date property: raw strings after mapping, a range after enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    /// A normalized range.
    Normalized(DateRange),
    /// Raw source text, one value or several.
    Raw(DateInput),
}

/// A temporal coverage entry: raw text or a normalized range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemporalValue {
    /// A normalized range.
    Normalized(DateRange),
    /// Raw source text.
    Raw(String),
}

/// The descriptive section of a canonical record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResource {
    /// Title, all title parts joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Creators.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub creator: Vec<String>,
    /// Contributors.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub contributor: Vec<String>,
    /// Publishers.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub publisher: Vec<String>,
    /// Date of the item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,
    /// Physical extent.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub extent: Vec<String>,
    /// Identifiers.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<String>,
    /// Rights statements.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub rights: Vec<String>,
    /// Subjects.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub subject: Vec<NamedValue>,
    /// Temporal coverage.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub temporal: Vec<TemporalValue>,
    /// Spatial coverage.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub spatial: Vec<SpatialValue>,
    /// Descriptions and notes.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    /// Formats (Internet Media Types after enrichment).
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub format: Vec<String>,
    /// Format values that are not media types.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub physical_format: Vec<String>,
    /// Languages.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub language: Vec<String>,
    /// Related resources.
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub relation: Vec<String>,
    /// Item types.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub item_type: Vec<String>,
}

impl SourceResource {
    /// Place records of the spatial property, skipping raw strings.
    pub fn places(&self) -> impl Iterator<Item = &PlaceRecord> {
        self.spatial.iter().filter_map(|value| match value {
            SpatialValue::Place(place) => Some(place),
            SpatialValue::Text(_) => None,
        })
    }
}

/// A record in the canonical item schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Item identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Item URI.
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Institution the record came from.
    #[serde(rename = "dataProvider", default, skip_serializing_if = "Option::is_none")]
    pub data_provider: Option<String>,
    /// Links to the item in its original context.
    #[serde(
        rename = "isShownAt",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub is_shown_at: Vec<String>,
    /// Thumbnail derived from the item link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_source_url: Option<String>,
    /// Descriptive metadata.
    #[serde(rename = "sourceResource", default)]
    pub source_resource: SourceResource,
}

impl CanonicalRecord {
    /// Serialize to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization itself fails.
    pub fn to_json(&self) -> crate::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the canonical shape.
    pub fn from_json(value: serde_json::Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Deserialize either a single value or a list of values into a `Vec`.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
        OneOrMany::Null(()) => Vec::new(),
    })
}
