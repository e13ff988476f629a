//! Common test fixtures shared across the test suite.

#![allow(dead_code)]

use marc_crosswalk::providers::gpo;
use marc_crosswalk::{CrosswalkConfig, Field, Leader, MappingEngine, SourceRecord};
use serde_json::{json, Value};

/// Leader of a monograph (leader/07 = `m`).
pub const MONOGRAPH_LEADER: &str = "01026cam a2200301 i 4500";

/// Leader of a serial (leader/07 = `s`).
pub const SERIAL_LEADER: &str = "01026cas a2200301 i 4500";

/// 008 whose position 18 is `m` (monthly).
pub const MONTHLY_008: &str = "850101c19849999dcumr p       0   a0eng d";

/// Route log output to the test harness. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An engine for the GPO provider with default configuration.
pub fn gpo_engine() -> MappingEngine {
    gpo_engine_with(CrosswalkConfig::default())
}

/// An engine for the GPO provider.
pub fn gpo_engine_with(config: CrosswalkConfig) -> MappingEngine {
    MappingEngine::new(gpo::provider().expect("GPO provider builds"), config)
}

/// Parse a leader, panicking on failure.
pub fn leader(raw: &str) -> Leader {
    Leader::parse(raw).expect("valid leader")
}

/// A field with the given subfields.
pub fn field(tag: &str, subfields: &[(char, &str)]) -> Field {
    let mut builder = Field::builder(tag, ' ', ' ');
    for (code, value) in subfields {
        builder = builder.subfield_str(*code, value);
    }
    builder.build()
}

/// A harvested GPO monograph in MARC-in-JSON form.
pub fn gpo_monograph_json() -> Value {
    json!({
        "leader": MONOGRAPH_LEADER,
        "controlfield": [
            {"tag": "001", "#text": "000123456"},
            {"tag": "008", "#text": "990101s1999    dcu           f000 0 eng d"}
        ],
        "datafield": [
            {"tag": "035", "ind1": " ", "ind2": " ", "subfield": [
                {"code": "a", "#text": "(OCoLC)12345"},
                {"code": "z", "#text": "(OCoLC)99999"}
            ]},
            {"tag": "086", "ind1": "0", "ind2": " ", "subfield": {"code": "a", "#text": "Y 4.AP 6/1:B 85"}},
            {"tag": "100", "ind1": "1", "ind2": " ", "subfield": [
                {"code": "a", "#text": "Smith, John,"},
                {"code": "d", "#text": "1950-"}
            ]},
            {"tag": "245", "ind1": "1", "ind2": "0", "subfield": [
                {"code": "a", "#text": "Budget of the United States :"},
                {"code": "b", "#text": "fiscal year 2000."}
            ]},
            {"tag": "260", "ind1": " ", "ind2": " ", "subfield": [
                {"code": "a", "#text": "Washington :"},
                {"code": "b", "#text": "U.S. G.P.O.,"},
                {"code": "c", "#text": "1999."}
            ]},
            {"tag": "264", "ind1": " ", "ind2": "1", "subfield": {"code": "c", "#text": "2001"}},
            {"tag": "300", "ind1": " ", "ind2": " ", "subfield": [
                {"code": "a", "#text": "xii, 340 p. ;"},
                {"code": "c", "#text": "28 cm."}
            ]},
            {"tag": "338", "ind1": " ", "ind2": " ", "subfield": {"code": "a", "#text": "volume"}},
            {"tag": "500", "ind1": " ", "ind2": " ", "subfield": {"code": "a", "#text": "Shipping list no.: 99-0001-P."}},
            {"tag": "538", "ind1": " ", "ind2": " ", "subfield": {"code": "a", "#text": "Mode of access: Internet."}},
            {"tag": "583", "ind1": " ", "ind2": " ", "subfield": [
                {"code": "a", "#text": "digitized"},
                {"code": "z", "#text": "Digitized from print."}
            ]},
            {"tag": "650", "ind1": " ", "ind2": "0", "subfield": [
                {"code": "a", "#text": "Budget"},
                {"code": "z", "#text": "United States"},
                {"code": "y", "#text": "1999-2000"}
            ]},
            {"tag": "651", "ind1": " ", "ind2": "0", "subfield": {"code": "a", "#text": "Ohio"}},
            {"tag": "700", "ind1": "1", "ind2": " ", "subfield": {"code": "a", "#text": "Doe, Jane."}},
            {"tag": "830", "ind1": " ", "ind2": "0", "subfield": {"code": "a", "#text": "House document ;"}},
            {"tag": "856", "ind1": "4", "ind2": "0", "subfield": [
                {"code": "u", "#text": "http://purl.access.gpo.gov/GPO/LPS1"},
                {"code": "z", "#text": "Address as of 1/1/2000"}
            ]},
            {"tag": "856", "ind1": "4", "ind2": "0", "subfield": [
                {"code": "u", "#text": "http://purl.access.gpo.gov/GPO/LPS2"}
            ]}
        ]
    })
}

/// A GPO serial with a monthly frequency code and no 310 note.
pub fn gpo_serial_record() -> SourceRecord {
    SourceRecord::builder(leader(SERIAL_LEADER))
        .control_field_str("001", "000777")
        .control_field_str("008", MONTHLY_008)
        .field(field("245", &[('a', "Monthly catalog")]))
        .field(field("260", &[('c', "1985-")]))
        .field(field("362", &[('a', "Vol. 1, no. 1 (Jan. 1985)-")]))
        .field(field("500", &[('a', "Description based on: Vol. 1.")]))
        .field(field("515", &[('a', "Description based on: Vol. 1.")]))
        .build()
}
