//! Fuzz target: state resolution
//!
//! Parses the input as a config document and resolves every checker's
//! states, plus one arbitrary state name, verifying:
//! - No panics and no endless parent walks under arbitrary documents
//! - A successful resolution always names a known callback
//!
//! cargo fuzz run fuzz_state_resolution

#![no_main]

use libfuzzer_sys::fuzz_target;
use lightnotifier::actions::Callback;
use lightnotifier::config::NotifierConfig;
use lightnotifier::dispatch::resolve_state;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = NotifierConfig::from_json(text) else {
        return;
    };

    for entry in config.checkers.values() {
        let names = entry.states.keys().map(String::as_str).chain(["clear", "error"]);
        for name in names {
            if let Ok(request) = resolve_state(entry, &config.states, name) {
                assert!(matches!(request.callback, Callback::TriggerLamp | Callback::PingLamp));
                assert_eq!(Callback::from_name(request.callback.name()), Ok(request.callback));
            }
        }
    }
});
