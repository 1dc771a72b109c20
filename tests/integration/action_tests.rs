//! Action executor against the recording device.

use futures_lite::future::block_on;
use lightnotifier::actions::ping::{self, PING_FLASHES, PingOutcome};
use lightnotifier::actions::{ActionOutcome, ActionRequest, Callback, execute, party};
use lightnotifier::drivers::light_state::{LightId, StateDescriptor};
use lightnotifier::error::{ConfigError, DeviceError, Error};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

use super::mock_device::{DeviceCall, MockDevice, RecordingDelay};

fn trigger(params: Value) -> ActionRequest {
    ActionRequest {
        callback: Callback::TriggerLamp,
        params,
    }
}

// ── triggerLamp ──────────────────────────────────────────────

#[test]
fn retry_alternates_on_and_off_and_ends_on() {
    let device = MockDevice::with_lights(&["8"]);
    let delay = RecordingDelay::default();
    let request = trigger(json!({
        "bulb": 8,
        "rgb": {"r": 255, "g": 0, "b": 0},
        "brightness": 100,
        "retry": {"count": 3, "delay": 100}
    }));

    let outcome = block_on(execute(&request, &device, &delay)).unwrap();

    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(device.on_sequence(), [true, false, true, false, true]);
    assert_eq!(*delay.waits.borrow(), [200, 500, 200, 500, 200]);
    assert!(device.writes().iter().all(|(light, _)| light == "8"));
}

#[test]
fn default_retry_sends_target_once() {
    let device = MockDevice::with_lights(&["8"]);
    let delay = RecordingDelay::default();
    let request = trigger(json!({"bulb": "8", "rgb": {"r": 0, "g": 255, "b": 0}}));

    block_on(execute(&request, &device, &delay)).unwrap();

    let writes = device.writes();
    assert_eq!(writes.len(), 1);
    let body = writes[0].1.to_hue_body();
    assert_eq!(body["on"], json!(true));
    assert_eq!(body["bri"], json!(254));
    assert_eq!(body["transitiontime"], json!(2));
    assert!(body["xy"].is_array());
}

#[test]
fn raw_state_is_passed_through_once() {
    let device = MockDevice::with_lights(&["3"]);
    let delay = RecordingDelay::default();
    let raw = json!({"on": true, "effect": "colorloop"});
    let request = trigger(json!({"bulb": 3, "state": raw, "retry": {"count": 5}}));

    block_on(execute(&request, &device, &delay)).unwrap();

    assert_eq!(device.writes(), [("3".to_string(), StateDescriptor::Raw(raw))]);
    assert!(delay.waits.borrow().is_empty());
}

#[test]
fn device_failure_mid_retry_propagates() {
    let device = MockDevice::with_lights(&["8"]).failing_write(1);
    let delay = RecordingDelay::default();
    let request = trigger(json!({"bulb": 8, "rgb": {"r": 1, "g": 2, "b": 3}, "retry": {"count": 3}}));

    let err = block_on(execute(&request, &device, &delay)).unwrap_err();

    assert_eq!(err, Error::Device(DeviceError::Transport("connection reset".into())));
    assert_eq!(device.writes().len(), 2);
}

#[test]
fn huge_retry_delay_is_rejected_before_any_write() {
    let device = MockDevice::with_lights(&["1"]);
    let delay = RecordingDelay::default();
    let request = trigger(json!({
        "bulb": 1,
        "rgb": {"r": 255, "g": 0, "b": 0},
        "retry": {"count": 2, "delay": u64::MAX}
    }));

    let err = block_on(execute(&request, &device, &delay)).unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::InvalidParams(_))));
    assert!(device.writes().is_empty());
}

// ── pingLamp ─────────────────────────────────────────────────

#[test]
fn ping_flashes_and_restores_a_lit_light() {
    let device = MockDevice::with_lights(&["2"]).status(
        "2",
        json!({"on": true, "bri": 120, "xy": [0.3, 0.3], "reachable": true, "colormode": "xy"}),
    );
    let delay = RecordingDelay::default();
    let request = ActionRequest {
        callback: Callback::PingLamp,
        params: json!({"bulb": 2}),
    };

    let outcome = block_on(execute(&request, &device, &delay)).unwrap();

    assert_eq!(outcome, ActionOutcome::Ping(PingOutcome::Completed));
    let writes = device.writes();
    assert_eq!(writes.len(), PING_FLASHES as usize * 2 + 1);
    assert_eq!(
        writes.last().unwrap().1,
        StateDescriptor::Raw(json!({"on": true, "bri": 120, "xy": [0.3, 0.3]}))
    );
}

#[test]
fn ping_leaves_a_dark_light_off() {
    let device = MockDevice::with_lights(&["2"]);
    let delay = RecordingDelay::default();

    block_on(ping::ping_lamp(&LightId::new("2"), &device, &delay)).unwrap();

    assert_eq!(device.writes().len(), PING_FLASHES as usize * 2);
    assert_eq!(device.on_sequence().last(), Some(&false));
}

#[test]
fn ping_of_unknown_light_lists_available_ones() {
    let device = MockDevice::with_lights(&["1", "4"]);
    let delay = RecordingDelay::default();

    let outcome = block_on(ping::ping_lamp(&LightId::new("99"), &device, &delay)).unwrap();

    assert_eq!(
        outcome,
        PingOutcome::Unavailable {
            light: LightId::new("99"),
            available: vec![LightId::new("1"), LightId::new("4")],
        }
    );
    assert!(device.writes().is_empty());
    assert_eq!(device.calls.borrow().last(), Some(&DeviceCall::Lights));
}

#[test]
fn ping_all_visits_every_light() {
    let device = MockDevice::with_lights(&["1", "2", "3"]);
    let delay = RecordingDelay::default();

    let outcomes = block_on(ping::ping_all(&device, &delay)).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|(_, o)| *o == PingOutcome::Completed));
    assert_eq!(device.writes().len(), 3 * PING_FLASHES as usize * 2);
}

// ── party ────────────────────────────────────────────────────

#[test]
fn party_colours_every_light_each_round() {
    let device = MockDevice::with_lights(&["1", "2"]);
    let delay = RecordingDelay::default();
    let mut rng = StdRng::seed_from_u64(7);

    block_on(party::party(&device, &delay, &mut rng)).unwrap();

    let rounds = party::PARTY_ROUNDS as usize;
    assert_eq!(device.writes().len(), rounds * 2);
    assert!(device.on_sequence().iter().all(|on| *on));
    assert!(delay.waits.borrow().iter().all(|ms| *ms == party::PARTY_STEP_MS));
}
