//! `init` provisioning flow against mock pairing and config ports.

use futures_lite::future::block_on;
use lightnotifier::config::NotifierConfig;
use lightnotifier::error::{ConfigError, DeviceError, Error};
use lightnotifier::provision::{DEVICE_TYPE, REGISTRATION_ATTEMPTS, REGISTRATION_INTERVAL_MS, provision};
use std::cell::RefCell;

use super::mock_device::{MemoryConfig, MockPairing, RecordingDelay};

fn pairing(host: Option<&str>, succeed_on: Option<usize>) -> MockPairing {
    MockPairing {
        host: host.map(str::to_string),
        succeed_on,
        attempts: RefCell::new(Vec::new()),
    }
}

#[test]
fn discovers_registers_and_saves_template() {
    let pairing = pairing(Some("192.168.1.20"), Some(3));
    let delay = RecordingDelay::default();
    let store = MemoryConfig::default();

    let config = block_on(provision(&pairing, &delay, &store, None)).unwrap();

    assert_eq!(config.bridge_credentials().unwrap(), ("192.168.1.20", "generated-user"));
    assert_eq!(store.stored.borrow().as_ref(), Some(&config));
    assert_eq!(pairing.attempts.borrow().len(), 3);
    assert!(pairing.attempts.borrow().iter().all(|(h, d)| h == "192.168.1.20" && d == DEVICE_TYPE));
    assert_eq!(*delay.waits.borrow(), [REGISTRATION_INTERVAL_MS; 3]);
}

#[test]
fn explicit_host_skips_discovery() {
    let pairing = pairing(None, Some(1));
    let delay = RecordingDelay::default();
    let store = MemoryConfig::default();

    let config = block_on(provision(&pairing, &delay, &store, Some("10.1.1.1".into()))).unwrap();

    assert_eq!(config.bridge.host.as_deref(), Some("10.1.1.1"));
}

#[test]
fn gives_up_after_all_attempts_and_writes_nothing() {
    let pairing = pairing(Some("192.168.1.20"), None);
    let delay = RecordingDelay::default();
    let store = MemoryConfig::default();

    let err = block_on(provision(&pairing, &delay, &store, None)).unwrap_err();

    assert!(matches!(err, Error::Device(DeviceError::Bridge { kind: 101, .. })));
    assert_eq!(pairing.attempts.borrow().len(), REGISTRATION_ATTEMPTS as usize);
    assert!(store.stored.borrow().is_none());
}

#[test]
fn existing_config_is_never_touched() {
    let pairing = pairing(Some("192.168.1.20"), Some(1));
    let delay = RecordingDelay::default();
    let store = MemoryConfig::default();
    let original = NotifierConfig::template(Some("old".into()), Some("old".into()));
    *store.stored.borrow_mut() = Some(original.clone());

    let err = block_on(provision(&pairing, &delay, &store, None)).unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::AlreadyExists(_))));
    assert!(pairing.attempts.borrow().is_empty());
    assert_eq!(store.stored.borrow().as_ref(), Some(&original));
}
