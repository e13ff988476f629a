//! Place normalization.
//!
//! Spatial values arrive as free text ("Charleston (S.C.); [Germany"), as
//! structured place records whose fields may be semicolon-joined composites
//! (`{"city": "La Jolla;Pasadena", "state": "California;North Carolina"}`),
//! or as a mix of both. [`normalize_location`] turns any of these into a
//! flat list of [`PlaceRecord`]s.
//!
//! The module also recognizes United States state names and their
//! abbreviations in free text. Abbreviations are matched conservatively so
//! that ordinary words do not turn into states: the word "in" never matches
//! Indiana, only "IN" or "In." do.

use crate::selector::iterify;
use crate::vocab::{state_by_name, state_by_postal, UsState, US_STATES};
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Delimiter between composite segments.
pub const SEGMENT_DELIMITER: char = ';';

/// Title-case abbreviations that spell a postal code but are ordinary words
/// in place strings ("Acme Co.", "Mt. Hood").
const NON_STATE_TITLE_PAIRS: &[&str] = &["Co.", "Ct.", "Mt.", "Ms."];

lazy_static! {
    static ref SPACED_DELIMITER: Regex = Regex::new(r"\s*;\s*").unwrap();
    static ref FULL_NAME: Regex = {
        let mut names: Vec<&str> = US_STATES.iter().map(|s| s.name).collect();
        names.sort_by_key(|n| std::cmp::Reverse(n.len()));
        let alternation = names
            .iter()
            .map(|n| regex::escape(n).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).unwrap()
    };
    static ref TRADITIONAL: Regex = {
        let mut forms: Vec<&str> = US_STATES
            .iter()
            .flat_map(|s| s.traditional.iter().copied())
            .collect();
        forms.sort_by_key(|f| std::cmp::Reverse(f.len()));
        let alternation = forms
            .iter()
            .map(|f| regex::escape(f))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"\b(?:{alternation})")).unwrap()
    };
    static ref TITLE_CASE_PAIR: Regex = Regex::new(r"\b[A-Z][a-z]\.").unwrap();
    static ref DOTTED_PAIR: Regex = Regex::new(r"\b([A-Z])\.\s?([A-Za-z])\.").unwrap();
    static ref PAREN_CODE: Regex = Regex::new(r"\(([A-Z]{2})\)").unwrap();
    static ref BARE_CODE: Regex = Regex::new(r"\b[A-Z]{2}\b").unwrap();
}

/// A structured place.
///
/// Unstructured input becomes `{name}`; structured input keeps whichever of
/// the other fields it had.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Free-text place name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// County.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    /// State.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO 3166-2 subdivision code.
    #[serde(rename = "iso3166-2", default, skip_serializing_if = "Option::is_none")]
    pub iso3166_2: Option<String>,
}

impl PlaceRecord {
    /// A place known only by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        PlaceRecord {
            name: Some(name.into()),
            ..PlaceRecord::default()
        }
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().into_iter().all(Option::is_none)
    }

    fn fields(&self) -> [&Option<String>; 6] {
        [
            &self.name,
            &self.city,
            &self.county,
            &self.state,
            &self.country,
            &self.iso3166_2,
        ]
    }

    fn fields_mut(&mut self) -> [&mut Option<String>; 6] {
        [
            &mut self.name,
            &mut self.city,
            &mut self.county,
            &mut self.state,
            &mut self.country,
            &mut self.iso3166_2,
        ]
    }
}

/// A spatial value before normalization: a place record or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpatialValue {
    /// Structured place.
    Place(PlaceRecord),
    /// Free text, possibly several places joined by semicolons.
    Text(String),
}

impl From<&str> for SpatialValue {
    fn from(text: &str) -> Self {
        SpatialValue::Text(text.to_string())
    }
}

impl From<PlaceRecord> for SpatialValue {
    fn from(place: PlaceRecord) -> Self {
        SpatialValue::Place(place)
    }
}

/// Collapse whitespace around semicolons: `"a ; b;  c"` becomes `"a;b;c"`.
#[must_use]
pub fn canonicalize_delimiters(text: &str) -> String {
    SPACED_DELIMITER
        .replace_all(text, ";")
        .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    FullName,
    Abbreviation,
}

#[derive(Debug, Clone, Copy)]
struct StateMatch {
    start: usize,
    end: usize,
    state: &'static UsState,
    kind: MatchKind,
}

fn preceded_by(text: &str, pos: usize, pred: impl Fn(char) -> bool) -> bool {
    text[..pos].chars().next_back().is_some_and(pred)
}

fn followed_by(text: &str, pos: usize, pred: impl Fn(char) -> bool) -> bool {
    text[pos..].chars().next().is_some_and(pred)
}

fn state_for_traditional(form: &str) -> Option<&'static UsState> {
    US_STATES.iter().find(|s| s.traditional.contains(&form))
}

/// Every state mention in `text`, in order of appearance.
///
/// Full names are found first. Abbreviation candidates that overlap an
/// already accepted span are discarded.
fn scan_states(text: &str) -> Vec<StateMatch> {
    let mut matches: Vec<StateMatch> = Vec::new();

    for m in FULL_NAME.find_iter(text) {
        let normalized = m.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        if let Some(state) = state_by_name(&normalized) {
            matches.push(StateMatch {
                start: m.start(),
                end: m.end(),
                state,
                kind: MatchKind::FullName,
            });
        }
    }

    let mut candidates: Vec<StateMatch> = Vec::new();
    let mut abbreviation = |start: usize, end: usize, state: Option<&'static UsState>| {
        if let Some(state) = state {
            candidates.push(StateMatch {
                start,
                end,
                state,
                kind: MatchKind::Abbreviation,
            });
        }
    };

    for m in TRADITIONAL.find_iter(text) {
        abbreviation(m.start(), m.end(), state_for_traditional(m.as_str()));
    }
    for m in TITLE_CASE_PAIR.find_iter(text) {
        if NON_STATE_TITLE_PAIRS.contains(&m.as_str()) {
            continue;
        }
        let code = m.as_str()[..2].to_ascii_uppercase();
        abbreviation(m.start(), m.end(), state_by_postal(&code));
    }
    for caps in DOTTED_PAIR.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        // Part of a longer dotted sequence such as "U.S.A."
        if preceded_by(text, m.start(), |c| c == '.')
            || followed_by(text, m.end(), char::is_alphabetic)
        {
            continue;
        }
        let code = format!("{}{}", &caps[1], &caps[2]).to_ascii_uppercase();
        abbreviation(m.start(), m.end(), state_by_postal(&code));
    }
    for caps in PAREN_CODE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        abbreviation(m.start(), m.end(), state_by_postal(&caps[1]));
    }
    for m in BARE_CODE.find_iter(text) {
        if followed_by(text, m.end(), |c| c == '.')
            && followed_by(text, m.end() + 1, char::is_alphabetic)
        {
            continue;
        }
        abbreviation(m.start(), m.end(), state_by_postal(m.as_str()));
    }

    for candidate in candidates {
        let overlaps = matches
            .iter()
            .any(|m| candidate.start < m.end && m.start < candidate.end);
        if !overlaps {
            matches.push(candidate);
        }
    }

    matches.sort_by_key(|m| m.start);
    matches
}

/// Full names of the states mentioned in `text`, by first appearance.
///
/// # Examples
///
/// ```
/// use marc_crosswalk::location::match_state_names;
///
/// let found = match_state_names("Athens in Ga.");
/// assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["Georgia"]);
/// ```
#[must_use]
pub fn match_state_names(text: &str) -> IndexSet<&'static str> {
    scan_states(text).into_iter().map(|m| m.state.name).collect()
}

/// ISO 3166-2 codes and full names of the states in `text`.
///
/// Both strings are semicolon-joined in order of appearance; `(None, None)`
/// when nothing matched. Unless `allow_ambiguous_abbrev` is set only full
/// state names count: abbreviations are skipped without blocking the full
/// names around them.
#[must_use]
pub fn resolve_iso_and_names(
    text: &str,
    allow_ambiguous_abbrev: bool,
) -> (Option<String>, Option<String>) {
    let mut states: IndexSet<&'static UsState> = IndexSet::new();
    for m in scan_states(text) {
        if allow_ambiguous_abbrev || m.kind == MatchKind::FullName {
            states.insert(m.state);
        }
    }
    if states.is_empty() {
        return (None, None);
    }
    let codes: Vec<String> = states.iter().map(|s| s.iso3166_2()).collect();
    let names: Vec<&str> = states.iter().map(|s| s.name).collect();
    (Some(codes.join(";")), Some(names.join(";")))
}

/// Positional segments of a composite value.
///
/// Interior empty segments keep their position; trailing ones are dropped,
/// so `"North Carolina;"` is one segment.
fn segments(value: &str) -> Vec<String> {
    let mut parts: Vec<String> = value
        .split(SEGMENT_DELIMITER)
        .map(|s| s.trim().to_string())
        .collect();
    while parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts
}

/// Split place records whose fields hold semicolon-joined composites.
///
/// `N` is the largest number of segments in any field of any input record,
/// and the output holds `N` records. Output record `i` takes the `i`-th
/// segment of every field that has one; shorter fields drop out of the
/// later records instead of repeating their last segment. When several
/// input records have a segment for the same field at the same position,
/// the earliest record's segment is kept. Empty segments leave the field
/// absent, and positions where every field is absent produce no record.
///
/// # Examples
///
/// ```
/// use marc_crosswalk::location::{split_composite_place_records, PlaceRecord};
///
/// let input = PlaceRecord {
///     city: Some("La Jolla;Pasadena".to_string()),
///     state: Some("California".to_string()),
///     ..PlaceRecord::default()
/// };
/// let out = split_composite_place_records(&[input]);
/// assert_eq!(out.len(), 2);
/// assert_eq!(out[1].city.as_deref(), Some("Pasadena"));
/// assert_eq!(out[1].state, None);
/// ```
#[must_use]
pub fn split_composite_place_records(records: &[PlaceRecord]) -> Vec<PlaceRecord> {
    let split: Vec<Vec<Vec<String>>> = records
        .iter()
        .map(|record| {
            record
                .fields()
                .iter()
                .map(|f| f.as_deref().map(segments).unwrap_or_default())
                .collect()
        })
        .collect();
    let n = split
        .iter()
        .flatten()
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    (0..n)
        .map(|i| {
            let mut out = PlaceRecord::default();
            for record in &split {
                for (slot, parts) in out.fields_mut().into_iter().zip(record) {
                    if slot.is_none() {
                        *slot = parts.get(i).filter(|s| !s.is_empty()).cloned();
                    }
                }
            }
            out
        })
        .filter(|place| !place.is_empty())
        .collect()
}

fn split_one(record: &PlaceRecord) -> Vec<PlaceRecord> {
    split_composite_place_records(std::slice::from_ref(record))
}

fn split_text(text: &str) -> Vec<PlaceRecord> {
    canonicalize_delimiters(text)
        .split(SEGMENT_DELIMITER)
        .map(|segment| {
            let segment = segment.trim();
            segment.strip_prefix('[').unwrap_or(segment).trim()
        })
        .filter(|name| !name.is_empty())
        .map(PlaceRecord::named)
        .collect()
}

/// Normalize spatial values into place records.
///
/// Free text is split on semicolons into `{name}` records, with one leading
/// `[` stripped from each name. Structured records go through
/// [`split_composite_place_records`]. Output keeps input order.
#[must_use]
pub fn normalize_location(values: &[SpatialValue]) -> Vec<PlaceRecord> {
    values
        .iter()
        .flat_map(|value| match value {
            SpatialValue::Text(text) => split_text(text),
            SpatialValue::Place(place) => split_one(place),
        })
        .collect()
}

/// Normalize a raw JSON spatial value: a string, an object, or a list of
/// either. Elements of any other shape are ignored.
#[must_use]
pub fn normalize_location_value(value: &Value) -> Vec<PlaceRecord> {
    let values: Vec<SpatialValue> = iterify(value)
        .into_iter()
        .filter_map(|v| serde_json::from_value(v.clone()).ok())
        .collect();
    normalize_location(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(text: &str) -> Vec<&'static str> {
        match_state_names(text).into_iter().collect()
    }

    #[test]
    fn test_canonicalize_delimiters() {
        assert_eq!(
            canonicalize_delimiters("California; Texas;New York ;  Minnesota  ; Arkansas ;Hawaii;"),
            "California;Texas;New York;Minnesota;Arkansas;Hawaii;"
        );
    }

    #[test]
    fn test_lowercase_word_is_not_a_state() {
        assert_eq!(names("Athens in Ga."), vec!["Georgia"]);
        assert!(names("hotels in town").is_empty());
    }

    #[test]
    fn test_abbreviation_forms() {
        assert_eq!(names("San Diego, C.A."), vec!["California"]);
        assert_eq!(names("San Diego, (CA)"), vec!["California"]);
        assert_eq!(names("Greenville, (S.C.)."), vec!["South Carolina"]);
        assert_eq!(names("Asheville NC "), vec!["North Carolina"]);
        assert_eq!(names("Cambridge, Mass."), vec!["Massachusetts"]);
    }

    #[test]
    fn test_many_abbreviations_in_order() {
        assert_eq!(
            names("San Diego (C.A.), Asheville (NC), Brookings S.d., Brooklyn  NY."),
            vec!["California", "North Carolina", "South Dakota", "New York"]
        );
    }

    #[test]
    fn test_longest_full_name_wins() {
        assert_eq!(names("Wheeling, West Virginia"), vec!["West Virginia"]);
        assert_eq!(names("Little Rock, Arkansas"), vec!["Arkansas"]);
        assert_eq!(names("new  york"), vec!["New York"]);
    }

    #[test]
    fn test_country_abbreviation_is_not_a_state() {
        assert!(names("Canada, Mexico, U.S.; Antarctica.").is_empty());
        assert!(names("Made in U.S.A.").is_empty());
    }

    #[test]
    fn test_ordinary_abbreviations_are_not_states() {
        assert_eq!(
            names("Washington, D.C. : G.P.O., n.d."),
            vec!["Washington", "District of Columbia"]
        );
        assert!(names("Acme Co., Springfield").is_empty());
        assert!(names("Mt. Hood; Ms. letters, p. 4").is_empty());
        assert_eq!(names("Indianapolis, In."), vec!["Indiana"]);
        assert_eq!(names("Brookings S.d."), vec!["South Dakota"]);
    }

    #[test]
    fn test_resolve_iso_with_abbreviations() {
        assert_eq!(
            resolve_iso_and_names("Cambridge, Mass.", true),
            (Some("US-MA".to_string()), Some("Massachusetts".to_string()))
        );
    }

    #[test]
    fn test_resolve_iso_nothing_found() {
        assert_eq!(
            resolve_iso_and_names("Canada, Mexico, U.S.; Antarctica.", false),
            (None, None)
        );
    }

    #[test]
    fn test_resolve_iso_skips_abbreviations_by_default() {
        let text = "California;New Mexico;Arizona;New York;(S.C.)";
        assert_eq!(
            resolve_iso_and_names(text, false),
            (
                Some("US-CA;US-NM;US-AZ;US-NY".to_string()),
                Some("California;New Mexico;Arizona;New York".to_string())
            )
        );
        let (codes, _) = resolve_iso_and_names(text, true);
        assert_eq!(codes.as_deref(), Some("US-CA;US-NM;US-AZ;US-NY;US-SC"));
    }

    #[test]
    fn test_split_single_segment() {
        let input = PlaceRecord {
            city: Some("Asheville".to_string()),
            county: Some("Buncombe".to_string()),
            state: Some("North Carolina;".to_string()),
            country: Some("United States".to_string()),
            iso3166_2: Some("US-NC".to_string()),
            ..PlaceRecord::default()
        };
        let out = split_composite_place_records(&[input]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].state.as_deref(), Some("North Carolina"));
        assert_eq!(out[0].iso3166_2.as_deref(), Some("US-NC"));
    }

    #[test]
    fn test_split_positional() {
        let input: PlaceRecord = serde_json::from_value(json!({
            "city": "La Jolla;Pasadena",
            "county": "San Diego;Los Angeles;Buncombe",
            "state": "California;North Carolina",
            "country": "United States",
            "iso3166-2": "US-CA;US-NC"
        }))
        .unwrap();
        let out = split_composite_place_records(&[input]);
        let out = serde_json::to_value(out).unwrap();
        assert_eq!(
            out,
            json!([
                {"city": "La Jolla", "county": "San Diego", "state": "California",
                 "country": "United States", "iso3166-2": "US-CA"},
                {"city": "Pasadena", "county": "Los Angeles", "state": "North Carolina",
                 "iso3166-2": "US-NC"},
                {"county": "Buncombe"}
            ])
        );
    }

    #[test]
    fn test_split_keeps_positions_across_empty_segments() {
        let input = PlaceRecord {
            city: Some("A;;C".to_string()),
            state: Some("X;Y;Z;".to_string()),
            ..PlaceRecord::default()
        };
        let out = split_composite_place_records(&[input]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].city, None);
        assert_eq!(out[1].state.as_deref(), Some("Y"));
        assert_eq!(out[2].city.as_deref(), Some("C"));
        assert_eq!(out[2].state.as_deref(), Some("Z"));
    }

    #[test]
    fn test_split_counts_segments_across_records() {
        let first = PlaceRecord {
            city: Some("A;B".to_string()),
            ..PlaceRecord::default()
        };
        let second = PlaceRecord {
            state: Some("Ohio".to_string()),
            ..PlaceRecord::default()
        };
        let out = split_composite_place_records(&[first, second]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].city.as_deref(), Some("A"));
        assert_eq!(out[0].state.as_deref(), Some("Ohio"));
        assert_eq!(out[1].city.as_deref(), Some("B"));
        assert_eq!(out[1].state, None);
    }

    #[test]
    fn test_text_split_and_bracket_removal() {
        let out = normalize_location(&[SpatialValue::from(
            "Charleston (S.C.); [Germany; Poland; Israel; New York (N.Y.); Georgia (U.S.)",
        )]);
        let names: Vec<_> = out.iter().filter_map(|p| p.name.as_deref()).collect();
        assert_eq!(
            names,
            vec!["Charleston (S.C.)", "Germany", "Poland", "Israel", "New York (N.Y.)", "Georgia (U.S.)"]
        );
    }

    #[test]
    fn test_mixed_values() {
        let out = normalize_location_value(&json!([
            {"country": "United States", "county": "Buncombe", "state": "North Carolina"},
            "Rushmore, Mount",
            "Mount Rushmore National Memorial"
        ]));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].county.as_deref(), Some("Buncombe"));
        assert_eq!(out[1], PlaceRecord::named("Rushmore, Mount"));
    }

    #[test]
    fn test_single_string_value() {
        let out = normalize_location_value(&json!("42 36. 00. N, 72 23. 55. W"));
        assert_eq!(out, vec![PlaceRecord::named("42 36. 00. N, 72 23. 55. W")]);
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_location(&[
            SpatialValue::from("Asheville; [La Jolla"),
            SpatialValue::from(PlaceRecord {
                city: Some("A;B".to_string()),
                ..PlaceRecord::default()
            }),
        ]);
        let again: Vec<SpatialValue> = once.iter().cloned().map(SpatialValue::Place).collect();
        assert_eq!(normalize_location(&again), once);
    }
}
