//! Rule tables: which tags feed which canonical properties.
//!
//! A [`RuleTable`] is an ordered list of [`Rule`]s. Each rule pairs a
//! [`TagPredicate`] with one or more [`Binding`]s, and each binding names a
//! [`Handler`] plus the [`CodeFilter`] that selects which subfields the
//! handler sees.
//!
//! Every rule whose predicate matches a tag fires, in table order. Several
//! rules may match the same tag on purpose: an added-entry name (700) feeds
//! both the contributor and the creator property.
//!
//! # Examples
//!
//! ```
//! use marc_crosswalk::rules::{CodeFilter, TagPredicate};
//!
//! // 500-537, 539-582 and 584-599: three disjoint closed intervals.
//! let notes = TagPredicate::ranges(&[(500, 537), (539, 582), (584, 599)]);
//! assert!(notes.matches(537));
//! assert!(!notes.matches(538));
//! assert!(!notes.matches(583));
//!
//! // Intervals plus individual tags.
//! let relation = TagPredicate::ranges(&[(760, 786)]).with_tags(&[490, 730, 740, 830]);
//! assert!(relation.matches(490));
//! assert!(relation.matches(786));
//!
//! let filter: CodeFilter = "!cd".parse().unwrap();
//! assert!(filter.admits('a'));
//! assert!(!filter.admits('c'));
//! ```

use crate::buffers::{BufferLayout, Buffers};
use crate::canonical::Property;
use crate::error::{CrosswalkError, Result};
use crate::record::{FieldInstance, Subfield};
use smallvec::SmallVec;
use std::convert::Infallible;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// A predicate over a numeric tag.
///
/// Membership is the union of a set of closed intervals and a set of
/// individual tags. Control field tags are their numeric value (001 is 1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPredicate {
    intervals: Vec<RangeInclusive<u16>>,
    tags: SmallVec<[u16; 8]>,
}

impl TagPredicate {
    /// Match exactly the given tags.
    #[must_use]
    pub fn tags(tags: &[u16]) -> Self {
        TagPredicate {
            intervals: Vec::new(),
            tags: tags.iter().copied().collect(),
        }
    }

    /// Match a single tag.
    #[must_use]
    pub fn tag(tag: u16) -> Self {
        Self::tags(&[tag])
    }

    /// Match any tag within the given closed intervals.
    #[must_use]
    pub fn ranges(intervals: &[(u16, u16)]) -> Self {
        TagPredicate {
            intervals: intervals.iter().map(|&(lo, hi)| lo..=hi).collect(),
            tags: SmallVec::new(),
        }
    }

    /// Add individual tags to the predicate.
    #[must_use]
    pub fn with_tags(mut self, tags: &[u16]) -> Self {
        self.tags.extend(tags.iter().copied());
        self
    }

    /// Whether the tag satisfies the predicate.
    #[must_use]
    pub fn matches(&self, tag: u16) -> bool {
        self.tags.contains(&tag) || self.intervals.iter().any(|r| r.contains(&tag))
    }
}

impl fmt::Display for TagPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .intervals
            .iter()
            .map(|r| format!("{:03}-{:03}", r.start(), r.end()))
            .collect();
        parts.extend(self.tags.iter().map(|t| format!("{t:03}")));
        write!(f, "{}", parts.join(","))
    }
}

/// Which subfield codes a binding hands to its handler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CodeFilter {
    /// Whatever the handler's default is.
    #[default]
    Default,
    /// Every subfield.
    All,
    /// Only these codes.
    Include(SmallVec<[char; 4]>),
    /// Every code except these.
    Exclude(SmallVec<[char; 4]>),
}

impl FromStr for CodeFilter {
    type Err = Infallible;

    /// Parse the compact rule notation: `""` is the handler default, `"ab"`
    /// includes `a` and `b`, and `"!cd"` excludes `c` and `d`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s.is_empty() {
            CodeFilter::Default
        } else if let Some(excluded) = s.strip_prefix('!') {
            CodeFilter::Exclude(excluded.chars().collect())
        } else {
            CodeFilter::Include(s.chars().collect())
        })
    }
}

impl CodeFilter {
    /// Shorthand for [`CodeFilter::Include`].
    #[must_use]
    pub fn include(codes: &str) -> Self {
        CodeFilter::Include(codes.chars().collect())
    }

    /// Shorthand for [`CodeFilter::Exclude`].
    #[must_use]
    pub fn exclude(codes: &str) -> Self {
        CodeFilter::Exclude(codes.chars().collect())
    }

    /// Replace [`CodeFilter::Default`] with the handler's default codes.
    ///
    /// An empty default means every subfield.
    #[must_use]
    pub fn resolve(&self, handler_default: &str) -> CodeFilter {
        match self {
            CodeFilter::Default if handler_default.is_empty() => CodeFilter::All,
            CodeFilter::Default => CodeFilter::include(handler_default),
            other => other.clone(),
        }
    }

    /// Whether a subfield code passes the filter.
    ///
    /// [`CodeFilter::Default`] admits everything; resolve it first to get
    /// handler-specific behavior.
    #[must_use]
    pub fn admits(&self, code: char) -> bool {
        match self {
            CodeFilter::Default | CodeFilter::All => true,
            CodeFilter::Include(codes) => codes.contains(&code),
            CodeFilter::Exclude(codes) => !codes.contains(&code),
        }
    }

    /// Whether the filter explicitly includes a code.
    #[must_use]
    pub fn includes(&self, code: char) -> bool {
        matches!(self, CodeFilter::Include(codes) if codes.contains(&code))
    }

    /// Values of the subfields that pass the filter, in source order.
    ///
    /// A control field has no subfields and yields its whole value.
    #[must_use]
    pub fn select<'a>(&self, instance: FieldInstance<'a>) -> Vec<&'a str> {
        match instance {
            FieldInstance::Control(value) => vec![value],
            FieldInstance::Data(field) => self.select_subfields(&field.subfields),
        }
    }

    fn select_subfields<'a>(&self, subfields: &'a [Subfield]) -> Vec<&'a str> {
        subfields
            .iter()
            .filter(|s| self.admits(s.code))
            .map(|s| s.value.as_str())
            .collect()
    }
}

/// How a handler turns the selected subfield values of one instance into
/// buffer entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Each subfield value is its own entry.
    Separate,
    /// The instance's values joined by a space form one entry.
    Space,
    /// The instance's values joined by `--` form one entry (subject strings).
    DoubleDash,
}

impl Join {
    /// Apply the join to one instance's selected values.
    ///
    /// Values are trimmed; empty values are dropped before joining.
    #[must_use]
    pub fn apply(self, values: &[&str]) -> Vec<String> {
        let mut parts = values.iter().map(|v| v.trim()).filter(|v| !v.is_empty());
        match self {
            Join::Separate => parts.map(str::to_string).collect(),
            Join::Space => join_nonempty(&mut parts, " "),
            Join::DoubleDash => join_nonempty(&mut parts, "--"),
        }
    }
}

fn join_nonempty<'a>(parts: &mut dyn Iterator<Item = &'a str>, sep: &str) -> Vec<String> {
    let joined = parts.collect::<Vec<_>>().join(sep);
    if joined.is_empty() {
        Vec::new()
    } else {
        vec![joined]
    }
}

/// One dispatched field instance, as seen by a handler.
#[derive(Debug, Clone, Copy)]
pub struct Dispatch<'a> {
    /// Tag of the instance.
    pub tag: &'a str,
    /// The field instance itself.
    pub instance: FieldInstance<'a>,
    /// The binding's filter with the handler default already resolved.
    pub filter: &'a CodeFilter,
    /// The binding's explicit precedence index, if any. Lower wins.
    pub precedence: Option<u8>,
}

/// Accumulation step of a handler: route extracted entries into buffers.
pub type AccumulateFn = fn(&mut Buffers, Property, &Dispatch<'_>, Vec<String>);

/// A named extraction handler bound to one canonical property.
#[derive(Clone, Copy)]
pub struct Handler {
    /// Name used in logs.
    pub name: &'static str,
    /// Property the handler writes to.
    pub property: Property,
    /// Codes used when a binding asks for the default; empty means all.
    pub default_codes: &'static str,
    /// How one instance's values become entries.
    pub join: Join,
    /// Where entries go.
    pub accumulate: AccumulateFn,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("property", &self.property)
            .field("default_codes", &self.default_codes)
            .field("join", &self.join)
            .finish_non_exhaustive()
    }
}

impl Handler {
    /// Run the handler over one dispatched instance.
    pub fn run(&self, buffers: &mut Buffers, dispatch: &Dispatch<'_>) {
        let selected = dispatch.filter.select(dispatch.instance);
        let entries = self.join.apply(&selected);
        (self.accumulate)(buffers, self.property, dispatch, entries);
    }
}

/// A handler bound to a rule with a code filter and optional precedence.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The handler to invoke.
    pub handler: Handler,
    /// Which subfields the handler sees.
    pub filter: CodeFilter,
    /// Explicit precedence index for keyed buffers; lower wins.
    pub precedence: Option<u8>,
}

impl Binding {
    /// Bind a handler with a filter in compact notation (see [`CodeFilter`]).
    #[must_use]
    pub fn new(handler: Handler, filter: &str) -> Self {
        Binding {
            handler,
            filter: filter.parse().unwrap_or_default(),
            precedence: None,
        }
    }

    /// Set an explicit precedence index.
    #[must_use]
    pub fn with_precedence(mut self, precedence: u8) -> Self {
        self.precedence = Some(precedence);
        self
    }

    /// The binding's filter with the handler default substituted.
    #[must_use]
    pub fn resolved_filter(&self) -> CodeFilter {
        self.filter.resolve(self.handler.default_codes)
    }
}

/// A tag predicate and the handlers it triggers.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Which tags the rule applies to.
    pub predicate: TagPredicate,
    /// Handlers to invoke, in order.
    pub bindings: Vec<Binding>,
}

impl Rule {
    /// Create a rule.
    #[must_use]
    pub fn new(predicate: TagPredicate, bindings: Vec<Binding>) -> Self {
        Rule {
            predicate,
            bindings,
        }
    }
}

/// An ordered list of rules, evaluated top to bottom.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Create a table from rules in evaluation order.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleTable { rules }
    }

    /// Append a rule at the end of the table.
    #[must_use]
    pub fn rule(mut self, predicate: TagPredicate, bindings: Vec<Binding>) -> Self {
        self.rules.push(Rule::new(predicate, bindings));
        self
    }

    /// All rules matching a tag, in table order.
    pub fn matching(&self, tag: u16) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |rule| rule.predicate.matches(tag))
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check that every binding targets a property the layout has a buffer for.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::UnknownProperty`] for the first binding whose
    /// property is missing from `layout`.
    pub fn validate(&self, layout: &BufferLayout) -> Result<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            for binding in &rule.bindings {
                if !layout.contains(binding.handler.property) {
                    return Err(CrosswalkError::UnknownProperty {
                        rule: index,
                        property: binding.handler.property.as_str().to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    fn field() -> Field {
        Field::builder("260", ' ', ' ')
            .subfield_str('a', "Washington :")
            .subfield_str('b', "G.P.O.,")
            .subfield_str('c', "1999.")
            .subfield_str('a', "Denver")
            .build()
    }

    #[test]
    fn test_disjoint_intervals() {
        let notes = TagPredicate::ranges(&[(500, 537), (539, 582), (584, 599)]);
        for tag in [500, 520, 537, 539, 582, 584, 599] {
            assert!(notes.matches(tag), "{tag} should match");
        }
        for tag in [499, 538, 583, 600] {
            assert!(!notes.matches(tag), "{tag} should not match");
        }
    }

    #[test]
    fn test_intervals_with_individual_tags() {
        let relation = TagPredicate::ranges(&[(760, 786)]).with_tags(&[490, 730, 740, 830]);
        assert!(relation.matches(760));
        assert!(relation.matches(830));
        assert!(!relation.matches(787));
        assert!(!relation.matches(491));
        assert_eq!(relation.to_string(), "760-786,490,730,740,830");
    }

    #[test]
    fn test_control_tag_predicate() {
        let ids = TagPredicate::tags(&[1, 20, 22]);
        assert!(ids.matches(1));
        assert!(!ids.matches(8));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("".parse::<CodeFilter>().unwrap(), CodeFilter::Default);
        assert_eq!("ab".parse::<CodeFilter>().unwrap(), CodeFilter::include("ab"));
        assert_eq!("!cd".parse::<CodeFilter>().unwrap(), CodeFilter::exclude("cd"));
    }

    #[test]
    fn test_include_keeps_source_order() {
        let field = field();
        let values = CodeFilter::include("ca").select(FieldInstance::Data(&field));
        assert_eq!(values, vec!["Washington :", "1999.", "Denver"]);
    }

    #[test]
    fn test_exclude_keeps_source_order() {
        let field = field();
        let values = CodeFilter::exclude("a").select(FieldInstance::Data(&field));
        assert_eq!(values, vec!["G.P.O.,", "1999."]);
    }

    #[test]
    fn test_control_field_yields_whole_value() {
        let values = CodeFilter::include("a").select(FieldInstance::Control("ocm123"));
        assert_eq!(values, vec!["ocm123"]);
    }

    #[test]
    fn test_resolve_default() {
        assert_eq!(CodeFilter::Default.resolve(""), CodeFilter::All);
        assert_eq!(CodeFilter::Default.resolve("u"), CodeFilter::include("u"));
        assert_eq!(CodeFilter::include("z").resolve("u"), CodeFilter::include("z"));
    }

    #[test]
    fn test_join_modes() {
        let values = ["Budget ", "", "United States"];
        assert_eq!(Join::Separate.apply(&values), vec!["Budget", "United States"]);
        assert_eq!(Join::Space.apply(&values), vec!["Budget United States"]);
        assert_eq!(Join::DoubleDash.apply(&values), vec!["Budget--United States"]);
        assert!(Join::Space.apply(&[" "]).is_empty());
    }
}
