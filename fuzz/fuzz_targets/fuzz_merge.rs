//! Fuzz target: inheritance merge
//!
//! Splits the input into two JSON documents and merges them, verifying:
//! - No panics under arbitrary JSON
//! - Merging a value onto itself returns it unchanged
//! - Every key of an object overlay survives an object merge
//!
//! cargo fuzz run fuzz_merge

#![no_main]

use libfuzzer_sys::fuzz_target;
use lightnotifier::merge::merge;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let mut halves = data.splitn(2, |b| *b == 0);
    let (Some(a), Some(b)) = (halves.next(), halves.next()) else {
        return;
    };
    let (Ok(base), Ok(overlay)) = (
        serde_json::from_slice::<Value>(a),
        serde_json::from_slice::<Value>(b),
    ) else {
        return;
    };

    if !base.is_null() {
        assert_eq!(merge(Some(&base), Some(&base)), Some(base.clone()));
    }

    if let (Value::Object(_), Some(Value::Object(merged))) = (&base, merge(Some(&base), Some(&overlay))) {
        if let Value::Object(over) = &overlay {
            assert!(over.keys().all(|k| merged.contains_key(k)));
        }
    }
});
