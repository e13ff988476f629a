//! Static vocabulary tables.
//!
//! Read-only lookup tables shared by every mapping and normalization run:
//! serial frequency codes, United States state names and abbreviations,
//! the Internet Media Type allowlist and the canonical type vocabulary.
//! Tables that need hashing are built once on first use and never mutated.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Serial frequency codes (008/18) and their labels.
pub const FREQUENCY_CODES: &[(char, &str)] = &[
    ('a', "Annual"),
    ('b', "Bimonthly"),
    ('c', "Semiweekly"),
    ('d', "Daily"),
    ('e', "Biweekly"),
    ('f', "Semiannual"),
    ('g', "Biennial"),
    ('h', "Triennial"),
    ('i', "Three times a week"),
    ('j', "Three times a month"),
    ('k', "Continuously updated"),
    ('m', "Monthly"),
    ('q', "Quarterly"),
    ('s', "Semimonthly"),
    ('t', "Three times a year"),
    ('u', "Unknown"),
    ('w', "Weekly"),
    ('z', "Other"),
];

/// Label for a serial frequency code.
#[must_use]
pub fn frequency_label(code: char) -> Option<&'static str> {
    FREQUENCY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
}

/// A United States state or district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsState {
    /// Full name, e.g. "North Carolina".
    pub name: &'static str,
    /// Two-letter postal code, e.g. "NC".
    pub postal: &'static str,
    /// Traditional (pre-postal) abbreviations, written with their dots.
    pub traditional: &'static [&'static str],
}

impl UsState {
    /// ISO 3166-2 subdivision code, e.g. "US-NC".
    #[must_use]
    pub fn iso3166_2(&self) -> String {
        format!("US-{}", self.postal)
    }
}

const fn state(
    name: &'static str,
    postal: &'static str,
    traditional: &'static [&'static str],
) -> UsState {
    UsState {
        name,
        postal,
        traditional,
    }
}

/// States, the District of Columbia, and their abbreviation forms.
pub const US_STATES: &[UsState] = &[
    state("Alabama", "AL", &["Ala."]),
    state("Alaska", "AK", &["Alas."]),
    state("Arizona", "AZ", &["Ariz."]),
    state("Arkansas", "AR", &["Ark."]),
    state("California", "CA", &["Calif.", "Cal."]),
    state("Colorado", "CO", &["Colo."]),
    state("Connecticut", "CT", &["Conn."]),
    state("Delaware", "DE", &["Del."]),
    state("District of Columbia", "DC", &["D.C."]),
    state("Florida", "FL", &["Fla."]),
    state("Georgia", "GA", &["Ga."]),
    state("Hawaii", "HI", &[]),
    state("Idaho", "ID", &["Ida."]),
    state("Illinois", "IL", &["Ill."]),
    state("Indiana", "IN", &["Ind."]),
    state("Iowa", "IA", &[]),
    state("Kansas", "KS", &["Kans.", "Kan."]),
    state("Kentucky", "KY", &["Ky."]),
    state("Louisiana", "LA", &["La."]),
    state("Maine", "ME", &[]),
    state("Maryland", "MD", &["Md."]),
    state("Massachusetts", "MA", &["Mass."]),
    state("Michigan", "MI", &["Mich."]),
    state("Minnesota", "MN", &["Minn."]),
    state("Mississippi", "MS", &["Miss."]),
    state("Missouri", "MO", &["Mo."]),
    state("Montana", "MT", &["Mont."]),
    state("Nebraska", "NE", &["Nebr.", "Neb."]),
    state("Nevada", "NV", &["Nev."]),
    state("New Hampshire", "NH", &["N.H."]),
    state("New Jersey", "NJ", &["N.J."]),
    state("New Mexico", "NM", &["N.M.", "N. Mex."]),
    state("New York", "NY", &["N.Y."]),
    state("North Carolina", "NC", &["N.C."]),
    state("North Dakota", "ND", &["N.D.", "N. Dak."]),
    state("Ohio", "OH", &[]),
    state("Oklahoma", "OK", &["Okla."]),
    state("Oregon", "OR", &["Oreg.", "Ore."]),
    state("Pennsylvania", "PA", &["Pa.", "Penn."]),
    state("Rhode Island", "RI", &["R.I."]),
    state("South Carolina", "SC", &["S.C."]),
    state("South Dakota", "SD", &["S.D.", "S. Dak."]),
    state("Tennessee", "TN", &["Tenn."]),
    state("Texas", "TX", &["Tex."]),
    state("Utah", "UT", &[]),
    state("Vermont", "VT", &["Vt."]),
    state("Virginia", "VA", &["Va."]),
    state("Washington", "WA", &["Wash."]),
    state("West Virginia", "WV", &["W. Va.", "W.Va."]),
    state("Wisconsin", "WI", &["Wis.", "Wisc."]),
    state("Wyoming", "WY", &["Wyo."]),
];

lazy_static! {
    static ref STATES_BY_POSTAL: HashMap<&'static str, &'static UsState> =
        US_STATES.iter().map(|s| (s.postal, s)).collect();
    static ref STATES_BY_NAME: HashMap<String, &'static UsState> = US_STATES
        .iter()
        .map(|s| (s.name.to_lowercase(), s))
        .collect();
    static ref TYPE_VOCABULARY: HashMap<&'static str, &'static str> = TYPE_TERMS
        .iter()
        .copied()
        .collect();
}

/// Look up a state by postal code (case-sensitive, e.g. "NC").
#[must_use]
pub fn state_by_postal(code: &str) -> Option<&'static UsState> {
    STATES_BY_POSTAL.get(code).copied()
}

/// Look up a state by full name, ignoring case.
#[must_use]
pub fn state_by_name(name: &str) -> Option<&'static UsState> {
    STATES_BY_NAME.get(&name.to_lowercase()).copied()
}

/// Top-level Internet Media Types accepted as format values.
pub const IMT_TOP_LEVEL_TYPES: &[&str] = &[
    "application",
    "audio",
    "font",
    "image",
    "message",
    "model",
    "multipart",
    "text",
    "video",
];

/// Whether a value is an Internet Media Type.
///
/// Accepts a bare allowlisted top-level type ("audio") or a `type/subtype`
/// pair whose top level is allowlisted ("image/jpeg"), ignoring case.
#[must_use]
pub fn is_imt(value: &str) -> bool {
    let lowered = value.trim().to_ascii_lowercase();
    let (top, sub) = match lowered.split_once('/') {
        Some((top, sub)) => (top, Some(sub)),
        None => (lowered.as_str(), None),
    };
    if !IMT_TOP_LEVEL_TYPES.contains(&top) {
        return false;
    }
    match sub {
        None => true,
        Some(sub) => {
            !sub.is_empty()
                && sub
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
        }
    }
}

/// Source type phrases (lowercased) and their canonical type.
const TYPE_TERMS: &[(&str, &str)] = &[
    ("text", "text"),
    ("texts", "text"),
    ("book", "text"),
    ("books", "text"),
    ("periodical", "text"),
    ("periodicals", "text"),
    ("manuscript", "text"),
    ("still image", "image"),
    ("still images", "image"),
    ("image", "image"),
    ("images", "image"),
    ("photograph", "image"),
    ("photographs", "image"),
    ("map", "image"),
    ("maps", "image"),
    ("moving image", "moving image"),
    ("moving images", "moving image"),
    ("film", "moving image"),
    ("video", "moving image"),
    ("sound", "sound"),
    ("sound recording", "sound"),
    ("audio", "sound"),
    ("physical object", "physical object"),
    ("object", "physical object"),
    ("interactive resource", "interactive resource"),
    ("software", "interactive resource"),
    ("dataset", "dataset"),
    ("collection", "collection"),
];

/// Canonical type for a source type phrase, ignoring case and surrounding space.
#[must_use]
pub fn canonical_type(value: &str) -> Option<&'static str> {
    TYPE_VOCABULARY
        .get(value.trim().to_lowercase().as_str())
        .copied()
}
