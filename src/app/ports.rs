//! Port traits: the hexagonal boundary between the dispatch engine and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (light bridge, checker modules, timers, event sinks,
//! config storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics, so
//! the engine never touches the network directly.
//!
//! Async ports take `&self`: every checker task borrows the same adapter
//! concurrently on a single-threaded executor.

use serde_json::Value;

use crate::checkers::Classification;
use crate::config::NotifierConfig;
use crate::drivers::light_state::{LightId, StateDescriptor};
use crate::error::{ConfigError, DeviceError};
use crate::merge::Fragment;

// ───────────────────────────────────────────────────────────────
// Device port (domain → light bridge)
// ───────────────────────────────────────────────────────────────

/// Write/read side of the indicator device.
#[allow(async_fn_in_trait)]
pub trait DevicePort {
    /// Apply a state to one light.
    async fn set_state(&self, light: &LightId, state: &StateDescriptor) -> Result<(), DeviceError>;

    /// Read a light's raw status object (the bridge's `state` section).
    async fn light_status(&self, light: &LightId) -> Result<Value, DeviceError>;

    /// All light ids known to the bridge.
    async fn lights(&self) -> Result<Vec<LightId>, DeviceError>;
}

// ───────────────────────────────────────────────────────────────
// Checker port (status source → domain)
// ───────────────────────────────────────────────────────────────

/// Runs a named checker module with its resolved config.
#[allow(async_fn_in_trait)]
pub trait CheckerPort {
    /// Classify the status source.  An unknown module name is a
    /// [`ConfigError::UnknownModule`]; module failures are
    /// [`CheckerError`](crate::error::CheckerError)s.
    async fn run_module(&self, module: &str, config: &Fragment) -> crate::error::Result<Classification>;
}

// ───────────────────────────────────────────────────────────────
// Delay primitive
// ───────────────────────────────────────────────────────────────

/// Suspends the calling task for at least `ms` milliseconds.
#[allow(async_fn_in_trait)]
pub trait DelayPort {
    async fn delay_ms(&self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The engine emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ config document)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the configuration document.
pub trait ConfigPort {
    /// Load and validate the document.
    fn load(&self) -> Result<NotifierConfig, ConfigError>;

    /// Whether a document is already stored.
    fn exists(&self) -> bool;

    /// Persist a new document.  Must refuse to overwrite an existing one.
    fn save(&self, config: &NotifierConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Bridge pairing port (provisioning)
// ───────────────────────────────────────────────────────────────

/// Outcome of one registration attempt against the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The bridge issued a username.
    Registered(String),
    /// The link button has not been pressed yet.
    LinkButtonNotPressed,
}

/// Bridge discovery and user registration.
#[allow(async_fn_in_trait)]
pub trait PairingPort {
    /// Find a bridge on the local network; returns its address.
    async fn discover(&self) -> Result<String, DeviceError>;

    /// Try once to register `device_type` as a user on the bridge at `host`.
    async fn register(&self, host: &str, device_type: &str) -> Result<Registration, DeviceError>;
}
