//! Government Publishing Office catalog records.
//!
//! GPO records are MARC bibliographic records harvested from the GPO
//! catalog. Beyond the shared handlers, the provider resolves four
//! properties itself:
//!
//! - **date**: an issuance note (362) wins. Publication dates (260, then
//!   264) are only consulted for monographs.
//! - **description**: serials without a frequency note (310) get one
//!   synthesized from the coded frequency in 008/18. All notes are then
//!   merged without duplicates.
//! - **rights**: public domain notice when no rights note was mapped.
//! - **isShownAt**: the first 856 URL, any 856 public notes, and a link to
//!   the catalog entry built from the control number.

use crate::buffers::{BufferLayout, Buffers};
use crate::canonical::{CanonicalRecord, Property};
use crate::engine::{FinalizeContext, Provider};
use crate::error::Result;
use crate::providers::marc::{
    self, assign, copy_flat_buffers, dedup, raw_date, CONTRIBUTOR, CREATOR, DESCRIPTION, EXTENT,
    FORMAT, IDENTIFIER, LANGUAGE, PUBLISHER, RELATION, RIGHTS, SPATIAL, SUBJECT, TEMPORAL, TITLE,
    TYPE,
};
use crate::rules::{Binding, Dispatch, Handler, RuleTable, TagPredicate};
use crate::vocab::frequency_label;

/// Provider name, used as the id prefix.
pub const NAME: &str = "gpo";

/// Rights statement used when a record carries none.
pub const DEFAULT_RIGHTS: &str = "Pursuant to Title 17 Section 105 of the United States Code, \
this file is not subject to copyright protection and is in the public domain. For more \
information please see http://www.gpo.gov/help/index.html#public_domain_copyright_notice.htm";

/// Catalog link template; `{}` is the control number.
pub const CATALOG_URI_TEMPLATE: &str =
    "http://catalog.gpo.gov/F/?func=direct&doc_number={}&format=999";

/// Position of the frequency code in the 008 field.
pub const FREQUENCY_POSITION: usize = 18;

/// Keys of the date buffer, in precedence order.
pub const DATE_KEYS: &[&str] = &["362", "260", "264"];
/// Keys of the description buffer, in output order.
pub const DESCRIPTION_KEYS: &[&str] = &["310", "5xx", "583"];
/// Keys of the isShownAt buffer.
pub const IS_SHOWN_AT_KEYS: &[&str] = &["856u", "856z3"];

const FREQUENCY_KEY: &str = "310";
const NOTES_KEY: &str = "5xx";
const ACTION_NOTE_KEY: &str = "583";
const URL_KEY: &str = "856u";
const PUBLIC_NOTE_KEY: &str = "856z3";

/// Frequency (310) and action (583) notes keep their own key; every other
/// note goes under `5xx`.
fn accumulate_description(
    buffers: &mut Buffers,
    property: Property,
    dispatch: &Dispatch<'_>,
    entries: Vec<String>,
) {
    let key = match dispatch.tag {
        FREQUENCY_KEY | ACTION_NOTE_KEY => dispatch.tag,
        _ => NOTES_KEY,
    };
    if let Some(buffer) = buffers.keyed_mut(property) {
        buffer.extend(key, dispatch.precedence, entries);
    }
}

/// URLs (`u`) keep only the first non-empty value seen in the record;
/// anything else is a public note and accumulates.
fn accumulate_is_shown_at(
    buffers: &mut Buffers,
    property: Property,
    dispatch: &Dispatch<'_>,
    entries: Vec<String>,
) {
    let Some(buffer) = buffers.keyed_mut(property) else {
        return;
    };
    if dispatch.filter.includes('u') {
        if buffer.is_empty_at(URL_KEY) {
            buffer.extend(URL_KEY, dispatch.precedence, entries.into_iter().take(1));
        }
    } else {
        buffer.extend(PUBLIC_NOTE_KEY, dispatch.precedence, entries);
    }
}

const GPO_DESCRIPTION: Handler = Handler {
    accumulate: accumulate_description,
    ..DESCRIPTION
};

const GPO_IS_SHOWN_AT: Handler = Handler {
    accumulate: accumulate_is_shown_at,
    ..marc::IS_SHOWN_AT
};

/// The GPO rule table.
#[must_use]
pub fn rules() -> RuleTable {
    let b = Binding::new;
    RuleTable::default()
        .rule(
            TagPredicate::tag(856),
            vec![b(GPO_IS_SHOWN_AT, "u"), b(GPO_IS_SHOWN_AT, "z")],
        )
        .rule(TagPredicate::tags(&[700, 710, 711]), vec![b(CONTRIBUTOR, "")])
        .rule(
            TagPredicate::tags(&[100, 110, 111, 700, 710, 711]),
            vec![b(CREATOR, "")],
        )
        .rule(
            TagPredicate::tags(&[260, 264]),
            vec![b(marc::DATE, "c"), b(PUBLISHER, "ab")],
        )
        .rule(TagPredicate::tag(362), vec![b(marc::DATE, "")])
        .rule(TagPredicate::tag(300), vec![b(EXTENT, "a")])
        .rule(TagPredicate::tags(&[1, 20, 22]), vec![b(IDENTIFIER, "")])
        .rule(
            TagPredicate::tags(&[35, 50, 74, 82, 86]),
            vec![b(IDENTIFIER, "a")],
        )
        .rule(TagPredicate::tag(506), vec![b(RIGHTS, "")])
        .rule(
            TagPredicate::tags(&[600, 610, 611, 630, 650, 651]),
            vec![b(SUBJECT, "")],
        )
        .rule(
            TagPredicate::tags(&[600, 610, 650, 651]),
            vec![b(TEMPORAL, "y")],
        )
        .rule(TagPredicate::tag(611), vec![b(TEMPORAL, "d")])
        .rule(TagPredicate::tags(&[255, 310]), vec![b(GPO_DESCRIPTION, "")])
        .rule(TagPredicate::tag(583), vec![b(GPO_DESCRIPTION, "z")])
        .rule(
            TagPredicate::ranges(&[(500, 537), (539, 582), (584, 599)]),
            vec![b(GPO_DESCRIPTION, "")],
        )
        .rule(TagPredicate::tags(&[337, 338, 340]), vec![b(FORMAT, "a")])
        .rule(TagPredicate::tags(&[41, 546]), vec![b(LANGUAGE, "")])
        .rule(TagPredicate::tag(650), vec![b(SPATIAL, "z")])
        .rule(TagPredicate::tag(651), vec![b(SPATIAL, "a")])
        .rule(
            TagPredicate::ranges(&[(760, 786)]).with_tags(&[490, 730, 740, 830]),
            vec![b(RELATION, "")],
        )
        .rule(TagPredicate::tag(337), vec![b(TYPE, "a")])
        .rule(TagPredicate::tag(655), vec![b(TYPE, "")])
        .rule(TagPredicate::tag(245), vec![b(TITLE, "")])
}

/// The GPO buffer layout.
#[must_use]
pub fn layout() -> BufferLayout {
    BufferLayout::new()
        .keyed(Property::IsShownAt, IS_SHOWN_AT_KEYS)
        .flat(Property::Contributor)
        .flat(Property::Creator)
        .keyed(Property::Date, DATE_KEYS)
        .flat(Property::Publisher)
        .flat(Property::Extent)
        .flat(Property::Identifier)
        .flat(Property::Rights)
        .flat(Property::Subject)
        .flat(Property::Temporal)
        .keyed(Property::Description, DESCRIPTION_KEYS)
        .flat(Property::Format)
        .flat(Property::Language)
        .flat(Property::Spatial)
        .flat(Property::Relation)
        .flat(Property::Type)
        .flat(Property::Title)
}

/// The GPO provider.
///
/// # Errors
///
/// Only if the rule table and layout disagree, which is a programming
/// error caught by this module's tests.
pub fn provider() -> Result<Provider> {
    Provider::new(NAME, rules(), layout(), finalize)
}

fn finalize(ctx: &FinalizeContext<'_>, out: &mut CanonicalRecord) {
    copy_flat_buffers(ctx, out, &[Property::Title, Property::Rights]);
    finalize_title(ctx, out);
    finalize_date(ctx, out);
    finalize_description(ctx, out);
    finalize_rights(ctx, out);
    finalize_is_shown_at(ctx, out);
}

fn finalize_title(ctx: &FinalizeContext<'_>, out: &mut CanonicalRecord) {
    assign(out, Property::Title, ctx.buffers.flat_values(Property::Title).to_vec());
}

fn finalize_date(ctx: &FinalizeContext<'_>, out: &mut CanonicalRecord) {
    let Some(date) = ctx.buffers.keyed(Property::Date) else {
        return;
    };
    let chosen = if ctx.record.leader.is_monograph() {
        date.first_non_empty().map(|(_, values)| values)
    } else {
        Some(date.get(DATE_KEYS[0])).filter(|values| !values.is_empty())
    };
    if let Some(values) = chosen {
        out.source_resource.date = raw_date(values.to_vec());
    }
}

fn finalize_description(ctx: &FinalizeContext<'_>, out: &mut CanonicalRecord) {
    let Some(notes) = ctx.buffers.keyed(Property::Description) else {
        return;
    };
    let mut description = Vec::new();
    if notes.is_empty_at(FREQUENCY_KEY) && ctx.record.leader.is_serial() {
        if let Some(label) = ctx
            .record
            .fixed_data_position(FREQUENCY_POSITION)
            .and_then(frequency_label)
        {
            description.push(label.to_string());
        }
    }
    description.extend(notes.iter_values().cloned());
    out.source_resource.description = dedup(&description);
}

fn finalize_rights(ctx: &FinalizeContext<'_>, out: &mut CanonicalRecord) {
    let rights = dedup(ctx.buffers.flat_values(Property::Rights));
    out.source_resource.rights = if rights.is_empty() {
        vec![DEFAULT_RIGHTS.to_string()]
    } else {
        rights
    };
}

fn finalize_is_shown_at(ctx: &FinalizeContext<'_>, out: &mut CanonicalRecord) {
    let mut links: Vec<String> = ctx
        .buffers
        .keyed(Property::IsShownAt)
        .map(|links| links.iter_values().filter(|v| !v.is_empty()).cloned().collect())
        .unwrap_or_default();
    if let Some(number) = ctx.record.control_number() {
        links.push(CATALOG_URI_TEMPLATE.replace("{}", number));
    }
    out.is_shown_at = links;
}
