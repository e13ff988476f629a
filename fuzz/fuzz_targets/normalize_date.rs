#![no_main]

use libfuzzer_sys::fuzz_target;
use marc_crosswalk::date::normalize_date_str;

fuzz_target!(|data: &str| {
    let range = normalize_date_str(data);
    assert_eq!(range.display_date, data.trim());
});
