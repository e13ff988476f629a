//! Integration tests for the GPO provider.

mod common;

use common::{
    field, gpo_engine, gpo_engine_with, gpo_monograph_json, gpo_serial_record, init_tracing, leader,
};
use marc_crosswalk::canonical::{DateValue, NamedValue};
use marc_crosswalk::providers::gpo::DEFAULT_RIGHTS;
use marc_crosswalk::{CrosswalkConfig, CrosswalkError, DateInput, PlaceRecord, SourceRecord};
use serde_json::json;

fn raw_date(value: &str) -> Option<DateValue> {
    Some(DateValue::Raw(DateInput::Single(value.to_string())))
}

#[test]
fn test_monograph_full_mapping() {
    let record = gpo_engine()
        .map_json(&gpo_monograph_json())
        .expect("record maps");
    let sr = &record.source_resource;

    assert_eq!(record.id.as_deref(), Some("gpo--000123456"));
    assert_eq!(
        sr.title.as_deref(),
        Some("Budget of the United States : fiscal year 2000.")
    );
    assert_eq!(sr.creator, vec!["Smith, John, 1950-", "Doe, Jane."]);
    assert_eq!(sr.contributor, vec!["Doe, Jane."]);
    assert_eq!(sr.publisher, vec!["Washington : U.S. G.P.O.,"]);
    assert_eq!(sr.extent, vec!["xii, 340 p. ;"]);
    assert_eq!(
        sr.identifier,
        vec!["(OCoLC)12345", "Y 4.AP 6/1:B 85", "000123456"]
    );
    assert_eq!(sr.format, vec!["volume"]);
    assert_eq!(sr.relation, vec!["House document ;"]);
    assert_eq!(
        sr.subject,
        vec![
            NamedValue::new("Budget--United States--1999-2000"),
            NamedValue::new("Ohio"),
        ]
    );
    let places: Vec<_> = sr.places().cloned().collect();
    assert_eq!(
        places,
        vec![PlaceRecord::named("United States"), PlaceRecord::named("Ohio")]
    );
    assert_eq!(sr.temporal.len(), 1);
}

#[test]
fn test_monograph_date_prefers_260_over_264() {
    let record = gpo_engine().map_json(&gpo_monograph_json()).expect("record maps");
    assert_eq!(record.source_resource.date, raw_date("1999."));
}

#[test]
fn test_issuance_note_wins_for_any_level() {
    let record = gpo_engine().map(&gpo_serial_record()).expect("record maps");
    assert_eq!(
        record.source_resource.date,
        raw_date("Vol. 1, no. 1 (Jan. 1985)-")
    );
}

#[test]
fn test_serial_ignores_publication_dates() {
    let record = SourceRecord::builder(leader(common::SERIAL_LEADER))
        .field(field("260", &[('c', "1985-")]))
        .field(field("264", &[('c', "1990")]))
        .build();
    let out = gpo_engine().map(&record).expect("record maps");
    assert!(out.source_resource.date.is_none());
}

#[test]
fn test_monograph_falls_back_to_264() {
    let record = SourceRecord::builder(leader(common::MONOGRAPH_LEADER))
        .field(field("264", &[('a', "Washington"), ('c', "2015")]))
        .build();
    let out = gpo_engine().map(&record).expect("record maps");
    assert_eq!(out.source_resource.date, raw_date("2015"));
}

#[test]
fn test_description_sources_and_ordering() {
    let record = gpo_engine().map_json(&gpo_monograph_json()).expect("record maps");
    // 538 is outside the note ranges; 583 contributes only $z.
    assert_eq!(
        record.source_resource.description,
        vec!["Shipping list no.: 99-0001-P.", "Digitized from print."]
    );
}

#[test]
fn test_serial_frequency_synthesized_and_deduplicated() {
    let record = gpo_engine().map(&gpo_serial_record()).expect("record maps");
    assert_eq!(
        record.source_resource.description,
        vec!["Monthly", "Description based on: Vol. 1."]
    );
}

#[test]
fn test_frequency_note_suppresses_synthesized_frequency() {
    let mut record = gpo_serial_record();
    record.add_field(field("310", &[('a', "Monthly, 1985-")]));
    let out = gpo_engine().map(&record).expect("record maps");
    assert_eq!(out.source_resource.description[0], "Monthly, 1985-");
    assert!(!out.source_resource.description.contains(&"Monthly".to_string()));
}

#[test]
fn test_frequency_needs_serial_leader() {
    let record = SourceRecord::builder(leader(common::MONOGRAPH_LEADER))
        .control_field_str("008", common::MONTHLY_008)
        .build();
    let out = gpo_engine().map(&record).expect("record maps");
    assert!(out.source_resource.description.is_empty());
}

#[test]
fn test_rights_default_only_when_absent() {
    let out = gpo_engine().map_json(&gpo_monograph_json()).expect("record maps");
    assert_eq!(out.source_resource.rights, vec![DEFAULT_RIGHTS]);

    let mut doc = gpo_monograph_json();
    doc["datafield"]
        .as_array_mut()
        .expect("datafield list")
        .push(json!({"tag": "506", "subfield": {"code": "a", "#text": "Restricted."}}));
    let out = gpo_engine().map_json(&doc).expect("record maps");
    assert_eq!(out.source_resource.rights, vec!["Restricted."]);
}

#[test]
fn test_is_shown_at_first_url_notes_and_catalog_link() {
    let out = gpo_engine().map_json(&gpo_monograph_json()).expect("record maps");
    assert_eq!(
        out.is_shown_at,
        vec![
            "http://purl.access.gpo.gov/GPO/LPS1",
            "Address as of 1/1/2000",
            "http://catalog.gpo.gov/F/?func=direct&doc_number=000123456&format=999",
        ]
    );
}

#[test]
fn test_no_control_number_no_catalog_link() {
    let record = SourceRecord::builder(leader(common::MONOGRAPH_LEADER))
        .field(field("856", &[('u', "http://example.org/doc")]))
        .build();
    let out = gpo_engine().map(&record).expect("record maps");
    assert_eq!(out.is_shown_at, vec!["http://example.org/doc"]);
    assert!(out.id.is_none());
}

#[test]
fn test_empty_record_gets_only_defaults() {
    let record = SourceRecord::new(leader(common::MONOGRAPH_LEADER));
    let out = gpo_engine().map(&record).expect("record maps");
    let value = out.to_json().expect("serializes");
    assert_eq!(
        value,
        json!({"sourceResource": {"rights": [DEFAULT_RIGHTS]}})
    );
}

#[test]
fn test_structural_errors() {
    init_tracing();
    let short = json!({"leader": "01026cam", "datafield": []});
    let err = gpo_engine().map_json(&short).expect_err("short leader");
    assert!(err.is_structural());
    assert!(matches!(err, CrosswalkError::InvalidLeader(_)));

    let bad_tag = json!({
        "leader": common::MONOGRAPH_LEADER,
        "datafield": [{"tag": "24A", "subfield": []}]
    });
    assert!(gpo_engine().map_json(&bad_tag).is_err());
    let lenient = gpo_engine_with(CrosswalkConfig::default().with_strict_mode(false));
    assert!(lenient.map_json(&bad_tag).is_ok());
}

#[test]
fn test_batch_mapping_preserves_order_and_isolates_failures() {
    let docs = vec![
        gpo_monograph_json(),
        json!({"datafield": []}),
        json!([{"leader": common::SERIAL_LEADER}, {"001": "42"}]),
    ];
    let results = gpo_engine().map_json_batch(&docs);
    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().expect("first maps").id.as_deref(),
        Some("gpo--000123456")
    );
    assert!(results[1].is_err());
    assert_eq!(
        results[2].as_ref().expect("third maps").id.as_deref(),
        Some("gpo--42")
    );
}

#[test]
fn test_map_and_enrich() {
    let record = SourceRecord::from_json(&gpo_monograph_json()).expect("decodes");
    let out = gpo_engine().map_and_enrich(&record).expect("record maps");
    let Some(DateValue::Normalized(range)) = &out.source_resource.date else {
        panic!("date should be normalized");
    };
    assert_eq!(range.start.as_deref(), Some("1999"));
    assert_eq!(range.display_date, "1999.");
    assert_eq!(out.source_resource.physical_format, vec!["volume"]);
    assert!(out.source_resource.format.is_empty());
}
