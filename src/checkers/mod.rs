//! Checker modules and the runner that feeds them their resolved config.
//!
//! A checker queries a status source and classifies it into a named state.
//! The set of modules is closed: [`BuiltinCheckers`] maps a config's
//! `module` name onto one of the compiled-in checkers, and an unknown name
//! is a [`ConfigError::UnknownModule`].

pub mod sentry;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::app::ports::CheckerPort;
use crate::config::CheckerEntry;
use crate::error::{CheckerError, ConfigError, Result};
use crate::merge::{Fragment, resolve_in_table};

use self::sentry::{IssueSource, SentryChecker};

/// State reported when a checker found nothing to signal.
pub const STATE_CLEAR: &str = "clear";

/// Result of one checker run: the state plus diagnostic fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub state: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Classification {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            data: Map::new(),
        }
    }

    /// Attach a diagnostic field.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    /// Accept an opaque module result; it must carry a string `state`.
    pub fn from_value(value: Value) -> core::result::Result<Self, CheckerError> {
        let Value::Object(mut data) = value else {
            return Err(CheckerError::MalformedResult);
        };
        match data.remove("state") {
            Some(Value::String(state)) => Ok(Self { state, data }),
            _ => Err(CheckerError::MalformedResult),
        }
    }
}

/// Resolve a checker's own config through the shared `configs` table.
pub fn resolve_checker_config(key: &str, entry: &CheckerEntry, configs: &Fragment) -> core::result::Result<Fragment, ConfigError> {
    resolve_in_table(&format!("checkers.{key}.config"), &entry.config, configs)
}

/// Resolve the entry's config and run its module.
///
/// Module failures propagate untouched; the caller decides how to report
/// them.
pub async fn run_checker<C: CheckerPort>(
    checkers: &C,
    key: &str,
    entry: &CheckerEntry,
    configs: &Fragment,
) -> Result<Classification> {
    let resolved = resolve_checker_config(key, entry, configs)?;
    log::debug!("checker '{}': running module '{}'", key, entry.module);
    checkers.run_module(&entry.module, &resolved).await
}

/// The compiled-in checker modules.
pub struct BuiltinCheckers<S> {
    sentry: SentryChecker<S>,
}

impl<S: IssueSource> BuiltinCheckers<S> {
    pub fn new(issues: S) -> Self {
        Self {
            sentry: SentryChecker::new(issues),
        }
    }
}

impl<S: IssueSource> CheckerPort for BuiltinCheckers<S> {
    async fn run_module(&self, module: &str, config: &Fragment) -> Result<Classification> {
        match module {
            sentry::MODULE_NAME => Ok(self.sentry.check(config).await?),
            other => Err(ConfigError::UnknownModule(other.to_string()).into()),
        }
    }
}
