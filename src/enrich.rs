//! Enrichment passes over a mapped canonical record.
//!
//! Mapping copies source values more or less verbatim. Enrichment then
//! normalizes the properties that downstream consumers search and facet
//! on: dates become ranges, places become structured records, and subject,
//! type and format strings are tidied against fixed vocabularies.
//!
//! Every pass is idempotent: enriching an enriched record changes nothing.

use crate::canonical::{CanonicalRecord, DateValue, NamedValue, SourceResource, TemporalValue};
use crate::config::EnrichOptions;
use crate::date::{normalize_date, normalize_date_str};
use crate::error::{CrosswalkError, Result};
use crate::location::{normalize_location, SpatialValue};
use crate::vocab::{canonical_type, is_imt};
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    static ref SPACED_DOUBLE_DASH: Regex = Regex::new(r"\s*--\s*").unwrap();
    static ref INNER_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref CONTENTDM_REFERENCE: Regex =
        Regex::new(r"^(https?://[^/?#]+)/u\?/([^,/?#]+),([0-9]+)$").unwrap();
}

/// Label on the handle that points at the item viewer.
const IMAGE_VIEW_LABEL: &str = "Image View:";

/// Apply the selected enrichment passes to a record in place.
///
/// # Examples
///
/// ```
/// use marc_crosswalk::canonical::{CanonicalRecord, DateValue};
/// use marc_crosswalk::config::EnrichOptions;
/// use marc_crosswalk::enrich::enrich_record;
/// use serde_json::json;
///
/// let mut record = CanonicalRecord::from_json(json!({
///     "sourceResource": {"date": "May 20, 1928", "type": "Still Images"}
/// }))?;
/// enrich_record(&mut record, &EnrichOptions::default());
///
/// let Some(DateValue::Normalized(range)) = &record.source_resource.date else {
///     panic!("date was not normalized");
/// };
/// assert_eq!(range.start.as_deref(), Some("1928-05-20"));
/// assert_eq!(record.source_resource.item_type, vec!["image"]);
/// # Ok::<(), marc_crosswalk::CrosswalkError>(())
/// ```
pub fn enrich_record(record: &mut CanonicalRecord, options: &EnrichOptions) {
    let id = record.id.clone().unwrap_or_default();
    let sr = &mut record.source_resource;
    if options.dates {
        enrich_dates(sr, &id);
    }
    if options.locations {
        enrich_locations(sr);
    }
    if options.subjects {
        enrich_subjects(sr);
    }
    if options.types {
        enrich_types(sr);
    }
    if options.formats {
        enrich_formats(sr);
    }
}

/// Normalize `date` into one range and `temporal` into a list of ranges.
///
/// The date keeps its display text even when it does not parse. Temporal
/// values that do not parse are dropped.
pub fn enrich_dates(sr: &mut SourceResource, id: &str) {
    if let Some(DateValue::Raw(input)) = &sr.date {
        let range = normalize_date(input);
        if !range.is_parsed() {
            warn!(id, date = %range.display_date, "date left unparsed");
        }
        sr.date = Some(DateValue::Normalized(range));
    }

    let temporal = std::mem::take(&mut sr.temporal);
    sr.temporal = temporal
        .into_iter()
        .filter_map(|value| match value {
            TemporalValue::Raw(text) => {
                let range = normalize_date_str(&text);
                if range.is_parsed() {
                    Some(TemporalValue::Normalized(range))
                } else {
                    warn!(id, temporal = %text, "dropping unparsed temporal value");
                    None
                }
            }
            normalized @ TemporalValue::Normalized(_) => Some(normalized),
        })
        .collect();
}

/// Split and structure `spatial` values.
pub fn enrich_locations(sr: &mut SourceResource) {
    if sr.spatial.is_empty() {
        return;
    }
    sr.spatial = normalize_location(&sr.spatial)
        .into_iter()
        .map(SpatialValue::Place)
        .collect();
}

/// Tidy one subject string.
///
/// Whitespace around `--` subdivision separators is removed, runs of
/// whitespace collapse to one space, and trailing periods go.
#[must_use]
pub fn clean_subject(subject: &str) -> String {
    let collapsed = INNER_WHITESPACE.replace_all(subject.trim(), " ");
    let joined = SPACED_DOUBLE_DASH.replace_all(&collapsed, "--");
    joined.trim_end_matches(|c: char| c == '.' || c.is_whitespace()).to_string()
}

/// Tidy subject strings, dropping empty and repeated ones.
pub fn enrich_subjects(sr: &mut SourceResource) {
    let cleaned: IndexSet<String> = sr
        .subject
        .iter()
        .map(|s| clean_subject(&s.name))
        .filter(|s| !s.is_empty())
        .collect();
    sr.subject = cleaned.into_iter().map(NamedValue::new).collect();
}

/// Map item types onto the canonical type vocabulary.
///
/// Unknown types pass through lowercased.
pub fn enrich_types(sr: &mut SourceResource) {
    let types: IndexSet<String> = sr
        .item_type
        .iter()
        .map(|t| {
            canonical_type(t).map_or_else(|| t.trim().to_lowercase(), str::to_string)
        })
        .filter(|t| !t.is_empty())
        .collect();
    sr.item_type = types.into_iter().collect();
}

/// Keep media types in `format` and move every other value to
/// `physicalFormat`.
pub fn enrich_formats(sr: &mut SourceResource) {
    let mut media: IndexSet<String> = IndexSet::new();
    let mut physical: IndexSet<String> = sr.physical_format.drain(..).collect();
    for value in sr.format.drain(..) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if is_imt(value) {
            media.insert(value.to_ascii_lowercase());
        } else {
            physical.insert(value.to_string());
        }
    }
    sr.format = media.into_iter().collect();
    sr.physical_format = physical.into_iter().collect();
}

/// Pick the item viewer URL out of labelled handle strings.
///
/// Aggregated image collections publish several handles per item
/// (`Thumbnail: ...`, `Image View: ...`, `Ranking: ...`); only the viewer
/// is a page a reader can land on.
#[must_use]
pub fn image_view_url<'a, I>(handles: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    handles
        .into_iter()
        .filter_map(|handle| handle.trim().strip_prefix(IMAGE_VIEW_LABEL))
        .map(str::trim)
        .find(|url| !url.is_empty())
}

/// Point `isShownAt` at the item viewer named in the handles.
///
/// Returns whether a viewer handle was found. The record is untouched
/// when none was.
pub fn select_image_view_is_shown_at(record: &mut CanonicalRecord, handles: &[String]) -> bool {
    match image_view_url(handles.iter().map(String::as_str)) {
        Some(url) => {
            record.is_shown_at = vec![url.to_string()];
            true
        }
        None => false,
    }
}

/// Derive a CONTENTdm thumbnail URL from an item reference URL.
///
/// References look like `http://host/u?/collection,pointer`.
///
/// # Errors
///
/// Returns [`CrosswalkError::InvalidSourceUrl`] if `source` is not a
/// CONTENTdm item reference.
///
/// # Examples
///
/// ```
/// use marc_crosswalk::enrich::contentdm_thumbnail_url;
///
/// let url = contentdm_thumbnail_url("http://repository.clemson.edu/u?/scp,104")?;
/// assert_eq!(
///     url,
///     "http://repository.clemson.edu/cgi-bin/thumbnail.exe?CISOROOT=/scp&CISOPTR=104"
/// );
/// assert!(contentdm_thumbnail_url("http://repository.clemson.edu/u?/scp").is_err());
/// # Ok::<(), marc_crosswalk::CrosswalkError>(())
/// ```
pub fn contentdm_thumbnail_url(source: &str) -> Result<String> {
    let caps = CONTENTDM_REFERENCE
        .captures(source.trim())
        .ok_or_else(|| CrosswalkError::InvalidSourceUrl(source.to_string()))?;
    Ok(format!(
        "{}/cgi-bin/thumbnail.exe?CISOROOT=/{}&CISOPTR={}",
        &caps[1], &caps[2], &caps[3]
    ))
}

/// Fill `preview_source_url` from the record's first `isShownAt` link.
///
/// # Errors
///
/// Returns [`CrosswalkError::InvalidSourceUrl`] if the record has no link
/// or the link is not a CONTENTdm item reference. The record is left
/// unchanged on error.
pub fn identify_preview_location(record: &mut CanonicalRecord) -> Result<()> {
    let source = record
        .is_shown_at
        .first()
        .ok_or_else(|| CrosswalkError::InvalidSourceUrl(String::new()))?;
    let preview = contentdm_thumbnail_url(source)?;
    record.preview_source_url = Some(preview);
    Ok(())
}
