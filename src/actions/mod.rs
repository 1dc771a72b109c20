//! Action registry and executor.
//!
//! A resolved state mapping names its action by string (`callback`).  The
//! set of actions is closed: [`Callback`] enumerates every action the
//! binary knows, and a name outside it is a
//! [`ConfigError::UnknownCallback`].  Adding an action means adding a
//! variant here, not editing config.
//!
//! | Callback      | Module          | Effect                                  |
//! |---------------|-----------------|-----------------------------------------|
//! | `triggerLamp` | [`trigger`]     | Set a light, with retry-with-off-cycle  |
//! | `pingLamp`    | [`ping`]        | Diagnostic flash; lists lights if gone  |

pub mod party;
pub mod ping;
pub mod trigger;

use core::fmt;

use serde_json::Value;

use crate::app::ports::{DelayPort, DevicePort};
use crate::error::{ConfigError, Result};
use crate::merge::Fragment;

use self::ping::{PingOutcome, PingParams};
use self::trigger::TriggerParams;

/// Every action a state mapping may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    TriggerLamp,
    PingLamp,
}

impl Callback {
    pub fn from_name(name: &str) -> core::result::Result<Self, ConfigError> {
        match name {
            "triggerLamp" => Ok(Self::TriggerLamp),
            "pingLamp" => Ok(Self::PingLamp),
            other => Err(ConfigError::UnknownCallback(other.to_string())),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::TriggerLamp => "triggerLamp",
            Self::PingLamp => "pingLamp",
        }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fully resolved instruction for the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub callback: Callback,
    pub params: Value,
}

impl ActionRequest {
    /// Build from a state mapping whose `parent` chain is already folded in.
    pub fn from_resolved(mapping: &Fragment) -> core::result::Result<Self, ConfigError> {
        let callback = match mapping.get("callback") {
            Some(Value::String(name)) => Callback::from_name(name)?,
            Some(Value::Null) | None => return Err(ConfigError::MissingCallback),
            Some(other) => return Err(ConfigError::UnknownCallback(other.to_string())),
        };
        let params = match mapping.get("params") {
            Some(Value::Null) | None => Value::Object(Fragment::new()),
            Some(p) => p.clone(),
        };
        Ok(Self { callback, params })
    }
}

/// What an executed action reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Ping(PingOutcome),
}

/// Run one action against the device.
///
/// Parameter errors are [`ConfigError::InvalidParams`]; device errors
/// propagate unchanged.
pub async fn execute<D: DevicePort, T: DelayPort>(request: &ActionRequest, device: &D, delay: &T) -> Result<ActionOutcome> {
    match request.callback {
        Callback::TriggerLamp => {
            let params = TriggerParams::from_value(&request.params)?;
            trigger::trigger_lamp(&params, device, delay).await?;
            Ok(ActionOutcome::Applied)
        }
        Callback::PingLamp => {
            let params = PingParams::from_value(&request.params)?;
            let outcome = ping::ping_lamp(&params.bulb, device, delay).await?;
            Ok(ActionOutcome::Ping(outcome))
        }
    }
}
