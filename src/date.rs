//! Free-text date normalization.
//!
//! [`normalize_date`] turns raw date text into a [`DateRange`]. A fixed set
//! of grammars is tried in priority order:
//!
//! 1. bare year: `1928`
//! 2. ISO date: `1928-05-20`
//! 3. US numeric date: `05/20/1928`
//! 4. natural language: `May 20, 1928`
//! 5. circa: `ca. 1928`, `c. 1928`
//! 6. explicit range: `1960 - 1970`, `1960-05-01 - 1960-05-15`
//! 7. hyphenated year range: `1960-1970`
//!
//! Before matching, enclosing square brackets and trailing periods are
//! ignored, so cataloged forms such as `[1999]` and `1999.` parse. Anything
//! else yields a range with no start and no end. The display date is always
//! the raw input, trimmed, whether or not it parsed.
//!
//! # Examples
//!
//! ```
//! use marc_crosswalk::date::normalize_date_str;
//!
//! let range = normalize_date_str("ca. 1928\n");
//! assert_eq!(range.start.as_deref(), Some("1928"));
//! assert_eq!(range.display_date, "ca. 1928");
//! ```

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref BARE_YEAR: Regex = Regex::new(r"^[0-9]{4}$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap();
    static ref US_DATE: Regex = Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").unwrap();
    static ref CIRCA: Regex = Regex::new(r"(?i)^ca?\.\s*(\S.*)$").unwrap();
    static ref YEAR_RANGE: Regex = Regex::new(r"^([0-9]{4})-([0-9]{4})$").unwrap();
}

/// Separator of an explicit range.
const RANGE_SEPARATOR: &str = " - ";

/// A normalized date: start and end, plus the text it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest date covered, `YYYY` or `YYYY-MM-DD`.
    #[serde(default)]
    pub start: Option<String>,
    /// Latest date covered, `YYYY` or `YYYY-MM-DD`.
    #[serde(default)]
    pub end: Option<String>,
    /// The raw input, trimmed.
    #[serde(rename = "displayDate")]
    pub display_date: String,
}

impl DateRange {
    /// A range with no start or end.
    #[must_use]
    pub fn unparsed(display_date: impl Into<String>) -> Self {
        DateRange {
            start: None,
            end: None,
            display_date: display_date.into(),
        }
    }

    /// Whether any grammar matched.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// Raw date input: one string or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// A single value.
    Single(String),
    /// Several candidate values.
    Multiple(Vec<String>),
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Single(value.to_string())
    }
}

impl From<Vec<String>> for DateInput {
    fn from(values: Vec<String>) -> Self {
        DateInput::Multiple(values)
    }
}

/// Normalize a date input.
///
/// A list is normalized value by value and the value whose start sorts
/// earliest wins outright: its start, end and display text become the
/// result. Ranges are never merged across values. When no value parses,
/// the first one is returned unparsed; an empty list gives an empty display
/// date.
#[must_use]
pub fn normalize_date(input: &DateInput) -> DateRange {
    match input {
        DateInput::Single(value) => normalize_date_str(value),
        DateInput::Multiple(values) => {
            let ranges: Vec<DateRange> = values.iter().map(|v| normalize_date_str(v)).collect();
            earliest(ranges)
        }
    }
}

fn earliest(ranges: Vec<DateRange>) -> DateRange {
    let mut winner: Option<DateRange> = None;
    let mut fallback: Option<DateRange> = None;
    for range in ranges {
        match (&range.start, winner.as_ref().and_then(|w| w.start.as_ref())) {
            (Some(start), Some(best)) if start < best => winner = Some(range),
            (Some(_), None) => winner = Some(range),
            (None, _) if fallback.is_none() => fallback = Some(range),
            _ => {}
        }
    }
    winner
        .or(fallback)
        .unwrap_or_else(|| DateRange::unparsed(""))
}

/// Normalize a single date string.
#[must_use]
pub fn normalize_date_str(raw: &str) -> DateRange {
    let display = raw.trim();
    match parse(strip_decoration(display)) {
        Some((start, end)) => DateRange {
            start: Some(start),
            end: Some(end),
            display_date: display.to_string(),
        },
        None => DateRange::unparsed(display),
    }
}

fn strip_decoration(text: &str) -> &str {
    let text = text.trim_end_matches('.').trim();
    text.strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text)
        .trim()
}

/// Try every grammar in priority order; `(start, end)` on success.
fn parse(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(single) = parse_single(text) {
        return Some((single.clone(), single));
    }
    if let Some(caps) = CIRCA.captures(text) {
        return parse(&caps[1]);
    }
    if let Some((a, b)) = text.split_once(RANGE_SEPARATOR) {
        let (start, _) = parse(a)?;
        let (_, end) = parse(b)?;
        return Some((start, end));
    }
    if let Some(caps) = YEAR_RANGE.captures(text) {
        return Some((caps[1].to_string(), caps[2].to_string()));
    }
    None
}

/// Grammars that denote one point in time, formatted as a start/end value.
fn parse_single(text: &str) -> Option<String> {
    if BARE_YEAR.is_match(text) {
        return Some(text.to_string());
    }
    if let Some(caps) = ISO_DATE.captures(text) {
        return calendar_date(&caps[1], &caps[2], &caps[3]).map(|_| text.to_string());
    }
    if let Some(caps) = US_DATE.captures(text) {
        return calendar_date(&caps[3], &caps[1], &caps[2]).map(iso);
    }
    NaiveDate::parse_from_str(text, "%B %d, %Y").ok().map(iso)
}

fn calendar_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
