//! Mock adapters for integration tests.
//!
//! Records every device call and every delay so tests can assert on the
//! full command history without touching a real bridge.

use std::cell::RefCell;
use std::collections::HashMap;

use lightnotifier::app::events::AppEvent;
use lightnotifier::app::ports::{
    CheckerPort, ConfigPort, DelayPort, DevicePort, EventSink, PairingPort, Registration,
};
use lightnotifier::checkers::Classification;
use lightnotifier::config::NotifierConfig;
use lightnotifier::drivers::light_state::{LightId, StateDescriptor};
use lightnotifier::error::{CheckerError, ConfigError, DeviceError, Result};
use lightnotifier::merge::Fragment;
use serde_json::{Value, json};

// ── Device call record ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    SetState { light: String, state: StateDescriptor },
    Status(String),
    Lights,
}

// ── MockDevice ───────────────────────────────────────────────

pub struct MockDevice {
    pub calls: RefCell<Vec<DeviceCall>>,
    lights: Vec<String>,
    statuses: HashMap<String, Value>,
    /// Fail the n-th `set_state` (0-based) with a transport error.
    fail_write: Option<usize>,
}

#[allow(dead_code)]
impl MockDevice {
    pub fn with_lights(ids: &[&str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            lights: ids.iter().map(|s| (*s).to_string()).collect(),
            statuses: HashMap::new(),
            fail_write: None,
        }
    }

    pub fn status(mut self, id: &str, state: Value) -> Self {
        self.statuses.insert(id.to_string(), state);
        self
    }

    pub fn failing_write(mut self, n: usize) -> Self {
        self.fail_write = Some(n);
        self
    }

    pub fn writes(&self) -> Vec<(String, StateDescriptor)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::SetState { light, state } => Some((light.clone(), state.clone())),
                _ => None,
            })
            .collect()
    }

    /// `on` flag of each write, in order.
    pub fn on_sequence(&self) -> Vec<bool> {
        self.writes()
            .iter()
            .map(|(_, s)| s.to_hue_body()["on"].as_bool().unwrap_or(false))
            .collect()
    }

    fn known(&self, light: &LightId) -> core::result::Result<(), DeviceError> {
        if self.lights.iter().any(|l| l == light.as_str()) {
            Ok(())
        } else {
            Err(DeviceError::Unavailable(format!("resource, /lights/{light}, not available")))
        }
    }
}

impl DevicePort for MockDevice {
    async fn set_state(&self, light: &LightId, state: &StateDescriptor) -> core::result::Result<(), DeviceError> {
        self.known(light)?;
        let index = self.writes().len();
        self.calls.borrow_mut().push(DeviceCall::SetState {
            light: light.to_string(),
            state: state.clone(),
        });
        if self.fail_write == Some(index) {
            return Err(DeviceError::Transport("connection reset".into()));
        }
        Ok(())
    }

    async fn light_status(&self, light: &LightId) -> core::result::Result<Value, DeviceError> {
        self.calls.borrow_mut().push(DeviceCall::Status(light.to_string()));
        self.known(light)?;
        Ok(self
            .statuses
            .get(light.as_str())
            .cloned()
            .unwrap_or_else(|| json!({"on": false, "reachable": true})))
    }

    async fn lights(&self) -> core::result::Result<Vec<LightId>, DeviceError> {
        self.calls.borrow_mut().push(DeviceCall::Lights);
        Ok(self.lights.iter().map(LightId::new).collect())
    }
}

// ── RecordingDelay ───────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDelay {
    pub waits: RefCell<Vec<u64>>,
}

impl DelayPort for RecordingDelay {
    async fn delay_ms(&self, ms: u64) {
        self.waits.borrow_mut().push(ms);
    }
}

// ── YieldingDelay ────────────────────────────────────────────

/// Records the wait and yields once, so other tasks get to run.
#[derive(Default)]
pub struct YieldingDelay {
    pub waits: RefCell<Vec<u64>>,
}

impl DelayPort for YieldingDelay {
    async fn delay_ms(&self, ms: u64) {
        self.waits.borrow_mut().push(ms);
        futures_lite::future::yield_now().await;
    }
}

// ── MockCheckers ─────────────────────────────────────────────

/// Answers per module name; modules without an answer fail.
#[derive(Default)]
pub struct MockCheckers {
    answers: HashMap<String, Classification>,
    pub seen: RefCell<Vec<(String, Fragment)>>,
}

#[allow(dead_code)]
impl MockCheckers {
    pub fn answer(mut self, module: &str, state: &str) -> Self {
        self.answers.insert(module.to_string(), Classification::new(state));
        self
    }
}

impl CheckerPort for MockCheckers {
    async fn run_module(&self, module: &str, config: &Fragment) -> Result<Classification> {
        self.seen.borrow_mut().push((module.to_string(), config.clone()));
        self.answers
            .get(module)
            .cloned()
            .ok_or_else(|| CheckerError::Request(format!("{module}: status API unreachable")).into())
    }
}

// ── RecordingSink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: RefCell<Vec<AppEvent>>,
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &AppEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// ── Provisioning mocks ───────────────────────────────────────

pub struct MockPairing {
    pub host: Option<String>,
    /// Registration succeeds on this attempt (1-based); never if `None`.
    pub succeed_on: Option<usize>,
    pub attempts: RefCell<Vec<(String, String)>>,
}

impl PairingPort for MockPairing {
    async fn discover(&self) -> core::result::Result<String, DeviceError> {
        self.host
            .clone()
            .ok_or_else(|| DeviceError::Unavailable("no bridge found".into()))
    }

    async fn register(&self, host: &str, device_type: &str) -> core::result::Result<Registration, DeviceError> {
        let mut attempts = self.attempts.borrow_mut();
        attempts.push((host.to_string(), device_type.to_string()));
        if Some(attempts.len()) == self.succeed_on {
            Ok(Registration::Registered("generated-user".into()))
        } else {
            Ok(Registration::LinkButtonNotPressed)
        }
    }
}

#[derive(Default)]
pub struct MemoryConfig {
    pub stored: RefCell<Option<NotifierConfig>>,
}

impl ConfigPort for MemoryConfig {
    fn load(&self) -> core::result::Result<NotifierConfig, ConfigError> {
        self.stored
            .borrow()
            .clone()
            .ok_or_else(|| ConfigError::Io("no document".into()))
    }

    fn exists(&self) -> bool {
        self.stored.borrow().is_some()
    }

    fn save(&self, config: &NotifierConfig) -> core::result::Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists("memory".into()));
        }
        *self.stored.borrow_mut() = Some(config.clone());
        Ok(())
    }
}
