//! Integration tests for the AppService → checker → dispatch → device
//! pipeline.

use futures_lite::future::block_on;
use lightnotifier::actions::Callback;
use lightnotifier::app::commands::RunRequest;
use lightnotifier::app::events::AppEvent;
use lightnotifier::app::service::{AppService, EntryOutcome};
use lightnotifier::checkers::Classification;
use lightnotifier::config::NotifierConfig;
use lightnotifier::error::{CheckerError, ConfigError, Error};
use serde_json::json;

use super::mock_device::{MockCheckers, MockDevice, RecordingDelay, RecordingSink, YieldingDelay};

fn config() -> NotifierConfig {
    NotifierConfig::from_json(
        &json!({
            "hueBridge": {"host": "10.0.0.2", "username": "u"},
            "states": {
                "error": {
                    "callback": "triggerLamp",
                    "params": {"rgb": {"r": 255, "g": 0, "b": 0}, "brightness": 100}
                },
                "*": {"callback": "triggerLamp"}
            },
            "configs": {"shared": {"token": "t", "timeout": 2}},
            "checkers": {
                "api": {
                    "name": "API errors",
                    "module": "healthy",
                    "config": {"parent": "shared", "project": "api"},
                    "states": {
                        "error": {"parent": "error", "params": {"bulb": 1}},
                        "*": {"parent": "*", "params": {"bulb": 1}}
                    }
                },
                "web": {
                    "module": "broken",
                    "states": {"*": {"parent": "*", "params": {"bulb": 2}}}
                },
                "ios": {
                    "module": "failing",
                    "states": {"*": {"parent": "*", "params": {"bulb": 3}}}
                }
            }
        })
        .to_string(),
    )
    .unwrap()
}

struct Fixture {
    config: NotifierConfig,
    checkers: MockCheckers,
    device: MockDevice,
    delay: RecordingDelay,
    sink: RecordingSink,
}

impl Fixture {
    fn new() -> Self {
        Self {
            config: config(),
            checkers: MockCheckers::default()
                .answer("healthy", "clear")
                .answer("broken", "error"),
            device: MockDevice::with_lights(&["1", "2", "3"]),
            delay: RecordingDelay::default(),
            sink: RecordingSink::default(),
        }
    }

    fn service(&self) -> AppService<'_, MockCheckers, MockDevice, RecordingDelay, RecordingSink> {
        AppService::new(&self.config, &self.checkers, &self.device, &self.delay, &self.sink)
    }
}

#[test]
fn one_failing_checker_does_not_stop_the_others() {
    let fx = Fixture::new();

    let report = block_on(fx.service().run(&RunRequest::default())).unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!((report.succeeded(), report.failed()), (2, 1));
    assert!(matches!(
        report.entry("ios").unwrap().result,
        Err(Error::Checker(CheckerError::Request(_)))
    ));

    let lights: Vec<String> = fx.device.writes().into_iter().map(|(l, _)| l).collect();
    assert!(lights.contains(&"1".to_string()));
    assert!(lights.contains(&"2".to_string()));
    assert!(!lights.contains(&"3".to_string()));

    let events = fx.sink.events.borrow();
    assert!(matches!(events.first(), Some(AppEvent::RunStarted { checkers: 3 })));
    assert!(events.iter().any(|e| matches!(e, AppEvent::EntryFailed { key, .. } if key == "ios")));
}

#[test]
fn classification_state_selects_the_mapping() {
    let fx = Fixture::new();
    let request = RunRequest {
        check: Some("web".into()),
        ..RunRequest::default()
    };

    let report = block_on(fx.service().run(&request)).unwrap();

    // "web" has only a wildcard mapping: the shared "*" is a plain off.
    match &report.entry("web").unwrap().result {
        Ok(EntryOutcome::Dispatched { state, request, .. }) => {
            assert_eq!(state, "error");
            assert_eq!(request.callback, Callback::TriggerLamp);
            assert_eq!(request.params, json!({"bulb": 2}));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fx.device.on_sequence(), [false]);
}

#[test]
fn checker_config_is_resolved_before_the_module_runs() {
    let fx = Fixture::new();
    let request = RunRequest {
        check: Some("api".into()),
        ..RunRequest::default()
    };

    block_on(fx.service().run(&request)).unwrap();

    let seen = fx.checkers.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "healthy");
    assert_eq!(
        serde_json::Value::Object(seen[0].1.clone()),
        json!({"token": "t", "timeout": 2, "project": "api"})
    );
}

#[test]
fn forced_state_skips_modules_and_inherits_shared_colour() {
    let fx = Fixture::new();
    let request = RunRequest {
        check: Some("api".into()),
        state: Some("error".into()),
        ..RunRequest::default()
    };

    let report = block_on(fx.service().run(&request)).unwrap();

    assert!(fx.checkers.seen.borrow().is_empty());
    match &report.entry("api").unwrap().result {
        Ok(EntryOutcome::Dispatched { request, .. }) => assert_eq!(
            request.params,
            json!({"rgb": {"r": 255, "g": 0, "b": 0}, "brightness": 100, "bulb": 1})
        ),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fx.device.on_sequence(), [true]);
}

#[test]
fn module_only_reports_without_touching_lights() {
    let fx = Fixture::new();
    let request = RunRequest {
        check: Some("api".into()),
        module_only: true,
        ..RunRequest::default()
    };

    let report = block_on(fx.service().run(&request)).unwrap();

    assert_eq!(
        report.entry("api").unwrap().result,
        Ok(EntryOutcome::Classified(Classification::new("clear")))
    );
    assert!(fx.device.calls.borrow().is_empty());
    assert!(
        fx.sink
            .events
            .borrow()
            .iter()
            .any(|e| matches!(e, AppEvent::Classified { key, .. } if key == "api"))
    );
}

#[test]
fn unknown_check_key_is_a_config_error() {
    let fx = Fixture::new();
    let request = RunRequest {
        check: Some("android".into()),
        ..RunRequest::default()
    };

    assert_eq!(
        block_on(fx.service().run(&request)).unwrap_err(),
        ConfigError::UnknownChecker("android".into())
    );
    assert!(fx.device.calls.borrow().is_empty());
}

#[test]
fn unknown_state_without_wildcard_fails_only_that_entry() {
    let mut fx = Fixture::new();
    fx.config
        .checkers
        .get_mut("web")
        .unwrap()
        .states
        .remove("*");

    let report = block_on(fx.service().run(&RunRequest::default())).unwrap();

    assert_eq!(
        report.entry("web").unwrap().result,
        Err(Error::Config(ConfigError::UnknownState("error".into())))
    );
    assert!(report.entry("api").unwrap().result.is_ok());
}

#[test]
fn waiting_entry_lets_siblings_write() {
    let config = NotifierConfig::from_json(
        &json!({
            "states": {"*": {"callback": "triggerLamp", "params": {"rgb": {"r": 0, "g": 0, "b": 255}, "retry": {"count": 3, "delay": 100}}}},
            "checkers": {
                "a": {"module": "m", "states": {"*": {"parent": "*", "params": {"bulb": 1}}}},
                "b": {"module": "m", "states": {"*": {"parent": "*", "params": {"bulb": 2}}}},
                "c": {"module": "broken", "states": {"*": {"parent": "*", "params": {"bulb": 3}}}}
            }
        })
        .to_string(),
    )
    .unwrap();
    let checkers = MockCheckers::default().answer("m", "error");
    let device = MockDevice::with_lights(&["1", "2", "3"]);
    let delay = YieldingDelay::default();
    let sink = RecordingSink::default();
    let service = AppService::new(&config, &checkers, &device, &delay, &sink);

    let report = block_on(service.run(&RunRequest::default())).unwrap();

    assert_eq!((report.succeeded(), report.failed()), (2, 1));
    let lights: Vec<String> = device.writes().into_iter().map(|(l, _)| l).collect();
    assert_eq!(lights.len(), 10);
    let first_b = lights.iter().position(|l| l == "2").unwrap();
    let last_a = lights.iter().rposition(|l| l == "1").unwrap();
    assert!(first_b < last_a, "entries ran one after another: {lights:?}");
}
