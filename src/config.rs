//! Notifier configuration document.
//!
//! Loaded once at startup (see [`JsonFileConfig`](crate::adapters::config_file::JsonFileConfig))
//! and then only ever borrowed.  Fragment-valued sections (`states`,
//! `configs`, per-checker `config` and `states`) are kept as raw JSON
//! objects; they only become typed once resolved through their `parent`
//! chains.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ConfigError;
use crate::merge::Fragment;

/// Hue bridge connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bridge IP address or host name.
    pub host: Option<String>,
    /// Whitelisted API user created by `init`.
    pub username: Option<String>,
}

/// One configured checker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckerEntry {
    /// Human-readable label used in logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Built-in checker module to run (e.g. `"sentry"`).
    pub module: String,
    /// Module settings; may name a `parent` in the shared `configs` table.
    #[serde(default)]
    pub config: Fragment,
    /// State name → state mapping fragment.
    #[serde(default)]
    pub states: Fragment,
}

impl CheckerEntry {
    /// Label for log lines: the configured name, or the module.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.module)
    }
}

/// Whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(rename = "hueBridge", default)]
    pub bridge: BridgeConfig,
    /// Shared state mappings that checker states may inherit from.
    #[serde(default)]
    pub states: Fragment,
    /// Shared checker settings that checker configs may inherit from.
    #[serde(default)]
    pub configs: Fragment,
    #[serde(default)]
    pub checkers: BTreeMap<String, CheckerEntry>,
}

impl NotifierConfig {
    /// Parse a configuration document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Structural checks that do not depend on which command runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, entry) in &self.checkers {
            if entry.module.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "checker '{key}' has an empty module"
                )));
            }
            if let Some((name, _)) = entry.states.iter().find(|(_, v)| !v.is_object()) {
                return Err(ConfigError::ValidationFailed(format!(
                    "checker '{key}' state '{name}' is not an object"
                )));
            }
        }
        if let Some((name, _)) = self.states.iter().find(|(_, v)| !v.is_object()) {
            return Err(ConfigError::ValidationFailed(format!(
                "shared state '{name}' is not an object"
            )));
        }
        Ok(())
    }

    /// Bridge host and username, required by every command that talks to a light.
    pub fn bridge_credentials(&self) -> Result<(&str, &str), ConfigError> {
        match (self.bridge.host.as_deref(), self.bridge.username.as_deref()) {
            (Some(host), Some(user)) if !host.is_empty() && !user.is_empty() => Ok((host, user)),
            _ => Err(ConfigError::ValidationFailed(
                "hueBridge.host and hueBridge.username are required".into(),
            )),
        }
    }

    /// Starter document written by `init`.
    pub fn template(host: Option<String>, username: Option<String>) -> Self {
        let fragment = |v: serde_json::Value| match v {
            serde_json::Value::Object(m) => m,
            _ => Fragment::new(),
        };

        let states = fragment(json!({
            "error": {
                "callback": "triggerLamp",
                "params": { "rgb": { "r": 255, "g": 0, "b": 0 }, "brightness": 100 }
            },
            "*": { "callback": "triggerLamp" }
        }));
        let configs = fragment(json!({
            "sentry": { "token": "...", "user": "...", "timeout": 2 }
        }));
        let ios = CheckerEntry {
            name: Some("Sentry ios".into()),
            module: "sentry".into(),
            config: fragment(json!({ "parent": "sentry", "project": "..." })),
            states: fragment(json!({
                "error": { "parent": "error", "params": { "bulb": 8 } },
                "*": { "parent": "*", "params": { "bulb": 8 } }
            })),
        };

        Self {
            bridge: BridgeConfig { host, username },
            states,
            configs,
            checkers: BTreeMap::from([("ios".to_string(), ios)]),
        }
    }
}
