#![no_main]

use libfuzzer_sys::fuzz_target;
use marc_crosswalk::providers::gpo;
use marc_crosswalk::{CrosswalkConfig, MappingEngine};

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(provider) = gpo::provider() else {
        return;
    };
    let engine = MappingEngine::new(provider, CrosswalkConfig::default());
    let _ = engine.map_json(&doc);
});
