//! Unified error types for the notifier.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! per-checker task's error handling uniform.  The three families map to
//! the three failure scopes of a run:
//!
//! - [`ConfigError`] is fatal to one checker entry's dispatch.
//! - [`CheckerError`] means the checker module failed; the entry is skipped.
//! - [`DeviceError`] comes from the light bridge; the action is abandoned.
//!
//! None of them abort sibling entries.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible pipeline step funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration is inconsistent for the entry being processed.
    Config(ConfigError),
    /// The checker module could not produce a classification.
    Checker(CheckerError),
    /// The light bridge rejected or failed a command.
    Device(DeviceError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Checker(e) => write!(f, "checker: {e}"),
            Self::Device(e) => write!(f, "device: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither the requested state nor the `*` wildcard is mapped.
    UnknownState(String),
    /// A `parent` reference names a fragment that does not exist.
    UnresolvedParent(String),
    /// A `parent` chain loops back on itself. Carries the chain in walk order.
    ParentCycle(Vec<String>),
    /// A `parent` value is not a string.
    InvalidParent,
    /// The resolved state mapping names an action outside the registry.
    UnknownCallback(String),
    /// The resolved state mapping has no `callback`.
    MissingCallback,
    /// Action parameters failed to decode or validate.
    InvalidParams(String),
    /// `--check` named a checker that is not configured.
    UnknownChecker(String),
    /// The entry's `module` is not a built-in checker.
    UnknownModule(String),
    /// A required config section is missing or malformed.
    ValidationFailed(String),
    /// The config document could not be read or written.
    Io(String),
    /// The config document is not valid JSON for the expected shape.
    Parse(String),
    /// Refused to overwrite an existing config file.
    AlreadyExists(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownState(s) => write!(f, "no mapping for state '{s}' and no '*' wildcard"),
            Self::UnresolvedParent(p) => write!(f, "parent '{p}' not found"),
            Self::ParentCycle(chain) => write!(f, "parent cycle: {}", chain.join(" -> ")),
            Self::InvalidParent => write!(f, "parent must be a string"),
            Self::UnknownCallback(c) => write!(f, "unknown callback '{c}'"),
            Self::MissingCallback => write!(f, "state mapping has no callback"),
            Self::InvalidParams(msg) => write!(f, "invalid action params: {msg}"),
            Self::UnknownChecker(k) => write!(f, "checker '{k}' is not configured"),
            Self::UnknownModule(m) => write!(f, "unknown checker module '{m}'"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::AlreadyExists(path) => write!(f, "config file {path} already exists"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Checker errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckerError {
    /// A required key is missing from the resolved checker config.
    MissingSetting(&'static str),
    /// The upstream status API could not be reached or answered with an error.
    Request(String),
    /// The upstream response did not have the expected shape.
    Decode(String),
    /// The module returned a result without a string `state`.
    MalformedResult,
}

impl fmt::Display for CheckerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(key) => write!(f, "missing setting '{key}'"),
            Self::Request(msg) => write!(f, "request failed: {msg}"),
            Self::Decode(msg) => write!(f, "unexpected response: {msg}"),
            Self::MalformedResult => write!(f, "result has no string 'state'"),
        }
    }
}

impl std::error::Error for CheckerError {}

impl From<CheckerError> for Error {
    fn from(e: CheckerError) -> Self {
        Self::Checker(e)
    }
}

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The addressed light does not exist or is unreachable on the bridge.
    Unavailable(String),
    /// The bridge answered with an error payload (`type`, `description`).
    Bridge { kind: u64, description: String },
    /// HTTP transport failure talking to the bridge.
    Transport(String),
    /// The bridge answered with something that is not the expected JSON.
    Decode(String),
}

impl DeviceError {
    /// `true` for the "device unavailable" condition the ping action recovers from.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "light not available: {msg}"),
            Self::Bridge { kind, description } => write!(f, "bridge error {kind}: {description}"),
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Decode(msg) => write!(f, "unexpected bridge response: {msg}"),
        }
    }
}

impl std::error::Error for DeviceError {}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Self::Device(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
