//! Handlers and finalize helpers shared by MARC providers.
//!
//! Each handler extracts the subfields its binding selects and joins them
//! the way the target property expects: names and titles as one
//! space-joined string per field, subject headings with `--` between
//! subdivisions, and codes or identifiers as separate values.
//!
//! [`copy_flat_buffers`] is the generic finalize step: it moves every flat
//! buffer a provider did not resolve itself into the descriptive section.

use crate::buffers::{accumulate, Buffer};
use crate::canonical::{CanonicalRecord, DateValue, NamedValue, Property, TemporalValue};
use crate::date::DateInput;
use crate::engine::FinalizeContext;
use crate::location::{PlaceRecord, SpatialValue};
use crate::rules::{Handler, Join};
use indexmap::IndexSet;

const fn handler(name: &'static str, property: Property, join: Join) -> Handler {
    Handler {
        name,
        property,
        default_codes: "",
        join,
        accumulate,
    }
}

/// Title parts, one entry per field.
pub const TITLE: Handler = handler("title", Property::Title, Join::Space);
/// Main and added-entry names.
pub const CREATOR: Handler = handler("creator", Property::Creator, Join::Space);
/// Added-entry names.
pub const CONTRIBUTOR: Handler = handler("contributor", Property::Contributor, Join::Space);
/// Publisher name and place.
pub const PUBLISHER: Handler = handler("publisher", Property::Publisher, Join::Space);
/// Dates, one entry per subfield.
pub const DATE: Handler = handler("date", Property::Date, Join::Separate);
/// Physical extent.
pub const EXTENT: Handler = handler("extent", Property::Extent, Join::Separate);
/// Control numbers and standard identifiers.
pub const IDENTIFIER: Handler = handler("identifier", Property::Identifier, Join::Separate);
/// Rights and access notes.
pub const RIGHTS: Handler = handler("rights", Property::Rights, Join::Space);
/// Subject headings with subdivisions joined by `--`.
pub const SUBJECT: Handler = handler("subject", Property::Subject, Join::DoubleDash);
/// Chronological subdivisions.
pub const TEMPORAL: Handler = handler("temporal", Property::Temporal, Join::Separate);
/// Notes.
pub const DESCRIPTION: Handler = handler("description", Property::Description, Join::Space);
/// Carrier and media terms.
pub const FORMAT: Handler = handler("format", Property::Format, Join::Separate);
/// Language codes and notes.
pub const LANGUAGE: Handler = handler("language", Property::Language, Join::Separate);
/// Geographic names.
pub const SPATIAL: Handler = handler("spatial", Property::Spatial, Join::Separate);
/// Series and linking entries.
pub const RELATION: Handler = handler("relation", Property::Relation, Join::Space);
/// Content and genre terms.
pub const TYPE: Handler = handler("type", Property::Type, Join::Space);
/// Electronic locations.
pub const IS_SHOWN_AT: Handler = handler("isShownAt", Property::IsShownAt, Join::Separate);

/// Values de-duplicated in first-seen order, empty strings dropped.
pub fn dedup<'a>(values: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// A date property from raw values: one value stays a string.
#[must_use]
pub fn raw_date(mut values: Vec<String>) -> Option<DateValue> {
    match values.len() {
        0 => None,
        1 => values.pop().map(|v| DateValue::Raw(DateInput::Single(v))),
        _ => Some(DateValue::Raw(DateInput::Multiple(values))),
    }
}

/// Store values under a property of the canonical record.
///
/// Replaces whatever the property held. An empty list leaves the property
/// absent.
pub fn assign(out: &mut CanonicalRecord, property: Property, values: Vec<String>) {
    let sr = &mut out.source_resource;
    match property {
        Property::Title => sr.title = (!values.is_empty()).then(|| values.join(" ")),
        Property::Creator => sr.creator = values,
        Property::Contributor => sr.contributor = values,
        Property::Publisher => sr.publisher = values,
        Property::Date => sr.date = raw_date(values),
        Property::Extent => sr.extent = values,
        Property::Identifier => sr.identifier = values,
        Property::Rights => sr.rights = values,
        Property::Subject => sr.subject = values.into_iter().map(NamedValue::new).collect(),
        Property::Temporal => sr.temporal = values.into_iter().map(TemporalValue::Raw).collect(),
        Property::Description => sr.description = values,
        Property::Format => sr.format = values,
        Property::Language => sr.language = values,
        Property::Spatial => {
            sr.spatial = values
                .into_iter()
                .map(|v| SpatialValue::Place(PlaceRecord::named(v)))
                .collect();
        }
        Property::Relation => sr.relation = values,
        Property::Type => sr.item_type = values,
        Property::IsShownAt => out.is_shown_at = values,
    }
}

/// Copy every flat buffer not listed in `skip` into the record.
///
/// Values are de-duplicated in first-seen order. Keyed buffers are left to
/// the provider's finalizer.
pub fn copy_flat_buffers(ctx: &FinalizeContext<'_>, out: &mut CanonicalRecord, skip: &[Property]) {
    for (property, buffer) in ctx.buffers.iter() {
        if skip.contains(&property) {
            continue;
        }
        if let Buffer::Flat(flat) = buffer {
            let values = dedup(flat.values());
            if !values.is_empty() {
                assign(out, property, values);
            }
        }
    }
}
