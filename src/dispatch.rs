//! State dispatcher: classification state → resolved action → executor.
//!
//! ```text
//!   state name ──▶ checker.states[name] | checker.states["*"]
//!                        │
//!                        ▼  parent chain (checker table, then shared table)
//!                  { callback, params }
//!                        │
//!                        ▼
//!                 actions::execute
//! ```
//!
//! A checker-level mapping names its parent by state name.  The name is
//! looked up in the checker's own `states` first, unless that link is
//! already on the chain, and then in the shared top-level `states`.
//! Shared mappings only inherit from other shared mappings.

use core::fmt;

use serde_json::Value;

use crate::actions::{self, ActionOutcome, ActionRequest};
use crate::app::ports::{DelayPort, DevicePort};
use crate::checkers::Classification;
use crate::config::CheckerEntry;
use crate::error::{ConfigError, Result};
use crate::merge::{Fragment, resolve_chain};

/// Mapping used when the exact state has none.
pub const WILDCARD_STATE: &str = "*";

/// Where the state to dispatch comes from.
#[derive(Debug, Clone, Copy)]
pub enum StateSource<'a> {
    /// Manually forced state name.
    Forced(&'a str),
    /// State reported by the checker module.
    Classified(&'a Classification),
}

impl StateSource<'_> {
    pub fn state_name(&self) -> &str {
        match self {
            Self::Forced(name) => name,
            Self::Classified(c) => &c.state,
        }
    }
}

/// Identity of one link in a state mapping chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Link {
    Checker(String),
    Shared(String),
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checker(name) => write!(f, "states.{name}"),
            Self::Shared(name) => write!(f, "shared.states.{name}"),
        }
    }
}

/// Pick the mapping for `state`, falling back to the wildcard.
pub fn select_mapping<'a>(states: &'a Fragment, state: &str) -> core::result::Result<(&'a str, &'a Fragment), ConfigError> {
    [state, WILDCARD_STATE]
        .into_iter()
        .find_map(|name| {
            states
                .get_key_value(name)
                .and_then(|(k, v)| v.as_object().map(|m| (k.as_str(), m)))
        })
        .ok_or_else(|| ConfigError::UnknownState(state.to_string()))
}

/// Resolve `state` for a checker into a terminal action request.
pub fn resolve_state(entry: &CheckerEntry, shared: &Fragment, state: &str) -> core::result::Result<ActionRequest, ConfigError> {
    fn table<'t>(t: &'t Fragment, name: &str) -> Option<&'t Fragment> {
        t.get(name).and_then(Value::as_object)
    }

    let (name, selected) = select_mapping(&entry.states, state)?;

    let resolved = resolve_chain((Link::Checker(name.to_string()), selected), |link, parent, visited| {
        let in_shared = || table(shared, parent).map(|m| (Link::Shared(parent.to_string()), m));
        match link {
            Link::Checker(_) => {
                let own = Link::Checker(parent.to_string());
                match table(&entry.states, parent) {
                    Some(m) if !visited.contains(&own) => Some((own, m)),
                    Some(m) => in_shared().or(Some((own, m))),
                    None => in_shared(),
                }
            }
            Link::Shared(_) => in_shared(),
        }
    })?;

    ActionRequest::from_resolved(&resolved)
}

/// Resolve the state for `entry` and run the action it maps to.
///
/// Exactly one action runs per call.
pub async fn resolve_and_dispatch<D: DevicePort, T: DelayPort>(
    entry: &CheckerEntry,
    shared: &Fragment,
    source: StateSource<'_>,
    device: &D,
    delay: &T,
) -> Result<(ActionRequest, ActionOutcome)> {
    let request = resolve_state(entry, shared, source.state_name())?;
    log::debug!("dispatch '{}' -> {}", source.state_name(), request.callback);
    let outcome = actions::execute(&request, device, delay).await?;
    Ok((request, outcome))
}
