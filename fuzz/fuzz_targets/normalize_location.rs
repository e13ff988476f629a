#![no_main]

use libfuzzer_sys::fuzz_target;
use marc_crosswalk::location::{resolve_iso_and_names, SpatialValue};
use marc_crosswalk::normalize_location;

fuzz_target!(|data: &str| {
    let once = normalize_location(&[SpatialValue::from(data)]);
    let again: Vec<SpatialValue> = once.iter().cloned().map(SpatialValue::Place).collect();
    assert_eq!(normalize_location(&again), once);
    let _ = resolve_iso_and_names(data, true);
});
