#![allow(missing_docs)]
//! Benchmarks for mapping and normalization.
//!
//! Measures single-record mapping, parallel batch mapping, and the date and
//! place normalizers using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marc_crosswalk::date::normalize_date_str;
use marc_crosswalk::location::match_state_names;
use marc_crosswalk::providers::gpo;
use marc_crosswalk::{normalize_location, CrosswalkConfig, MappingEngine, SpatialValue};
use serde_json::{json, Value};

/// A harvested GPO record with the fields most providers populate.
fn sample_record(n: usize) -> Value {
    json!({
        "leader": "01026cam a2200301 i 4500",
        "controlfield": [
            {"tag": "001", "#text": format!("{n:09}")},
            {"tag": "008", "#text": "990101s1999    dcu           f000 0 eng d"}
        ],
        "datafield": [
            {"tag": "035", "ind1": " ", "ind2": " ", "subfield": {"code": "a", "#text": "(OCoLC)12345"}},
            {"tag": "100", "ind1": "1", "ind2": " ", "subfield": {"code": "a", "#text": "Smith, John."}},
            {"tag": "245", "ind1": "1", "ind2": "0", "subfield": [
                {"code": "a", "#text": "Annual report :"},
                {"code": "b", "#text": "fiscal year 1999."}
            ]},
            {"tag": "260", "ind1": " ", "ind2": " ", "subfield": [
                {"code": "a", "#text": "Washington :"},
                {"code": "c", "#text": "1999."}
            ]},
            {"tag": "500", "ind1": " ", "ind2": " ", "subfield": {"code": "a", "#text": "Shipping list no.: 99-0001-P."}},
            {"tag": "650", "ind1": " ", "ind2": "0", "subfield": [
                {"code": "a", "#text": "Budget"},
                {"code": "z", "#text": "Ohio"},
                {"code": "y", "#text": "1999-2000"}
            ]},
            {"tag": "856", "ind1": "4", "ind2": "0", "subfield": {"code": "u", "#text": "http://purl.access.gpo.gov/GPO/LPS1"}}
        ]
    })
}

fn engine() -> MappingEngine {
    MappingEngine::new(
        gpo::provider().expect("GPO provider builds"),
        CrosswalkConfig::default(),
    )
}

/// Benchmark mapping one record.
fn benchmark_map_single(c: &mut Criterion) {
    let engine = engine();
    let doc = sample_record(1);

    c.bench_function("map_single_record", |b| {
        b.iter(|| engine.map_json(black_box(&doc)));
    });
}

/// Benchmark mapping and enriching one record.
fn benchmark_map_and_enrich(c: &mut Criterion) {
    let engine = engine();
    let record = marc_crosswalk::SourceRecord::from_json(&sample_record(1)).expect("decodes");

    c.bench_function("map_and_enrich_record", |b| {
        b.iter(|| engine.map_and_enrich(black_box(&record)));
    });
}

/// Benchmark mapping 1,000 records in parallel.
fn benchmark_map_batch_1k(c: &mut Criterion) {
    let engine = engine();
    let docs: Vec<Value> = (0..1_000).map(sample_record).collect();

    c.bench_function("map_batch_1k_records", |b| {
        b.iter(|| engine.map_json_batch(black_box(&docs)).len());
    });
}

/// Benchmark the date grammars.
fn benchmark_normalize_dates(c: &mut Criterion) {
    let inputs = [
        "1928",
        "May 20, 1928",
        "ca. 1928",
        "1960-05-01 - 1960-05-15",
        "BOGUS!",
    ];

    c.bench_function("normalize_dates", |b| {
        b.iter(|| {
            inputs
                .iter()
                .filter(|input| normalize_date_str(black_box(input)).is_parsed())
                .count()
        });
    });
}

/// Benchmark place splitting and state recognition.
fn benchmark_normalize_places(c: &mut Criterion) {
    let text = "San Diego (C.A.), Asheville (NC); [Brookings S.d.; Brooklyn  NY.; West Virginia";
    let values = [SpatialValue::from(text)];

    c.bench_function("normalize_places", |b| {
        b.iter(|| normalize_location(black_box(&values)).len());
    });
    c.bench_function("match_state_names", |b| {
        b.iter(|| match_state_names(black_box(text)).len());
    });
}

criterion_group!(
    benches,
    benchmark_map_single,
    benchmark_map_and_enrich,
    benchmark_map_batch_1k,
    benchmark_normalize_dates,
    benchmark_normalize_places,
);
criterion_main!(benches);
