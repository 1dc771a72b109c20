//! `triggerLamp`: put a light into a state, with retry-with-off-cycle.
//!
//! A light on a flaky mesh may miss a single command.  With a retry policy
//! of `count` the target state is applied `count` times; every repeat
//! after the first is preceded by an off pulse so the change is visible.
//!
//! ```text
//!  count = 3, delay = d
//!
//!  ON ─ 200ms ─ OFF ─ (d + 400ms) ─ ON ─ 200ms ─ OFF ─ (d + 400ms) ─ ON ─ 200ms
//! ```
//!
//! A raw `state` object bypasses all of this and goes to the bridge as is.

use serde::Deserialize;
use serde_json::Value;

use crate::app::ports::{DelayPort, DevicePort};
use crate::drivers::light_state::{LightId, LightState, Rgb, StateDescriptor};
use crate::error::{ConfigError, DeviceError};

/// Fade-out time of the off pulse.
pub const OFF_TRANSITION_MS: u32 = 400;
/// Fade-in time of the target state.
pub const ON_TRANSITION_MS: u32 = 200;
/// Brightness used when none is configured.
pub const DEFAULT_BRIGHTNESS: u8 = 100;
/// Upper bound for `retry.delay` (one hour).
pub const MAX_RETRY_DELAY_MS: u64 = 3_600_000;

/// Bounded repeat policy for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Number of times the target state is applied (≥ 1).
    pub count: u32,
    /// Extra pause before each repeat, in milliseconds.
    pub delay: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { count: 1, delay: 500 }
    }
}

/// Decoded `triggerLamp` params.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerParams {
    pub bulb: LightId,
    #[serde(default)]
    pub rgb: Option<Rgb>,
    /// Percent, 0–100.
    #[serde(default)]
    pub brightness: Option<u8>,
    #[serde(default)]
    pub on: Option<bool>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    /// Raw bridge state; when present every other field is ignored.
    #[serde(default)]
    pub state: Option<Value>,
}

impl TriggerParams {
    pub fn from_value(params: &Value) -> Result<Self, ConfigError> {
        let parsed: Self = serde_json::from_value(params.clone())
            .map_err(|e| ConfigError::InvalidParams(format!("triggerLamp: {e}")))?;
        if parsed.retry.is_some_and(|r| r.count == 0) {
            return Err(ConfigError::InvalidParams("triggerLamp: retry.count must be at least 1".into()));
        }
        if parsed.retry.is_some_and(|r| r.delay > MAX_RETRY_DELAY_MS) {
            return Err(ConfigError::InvalidParams(format!(
                "triggerLamp: retry.delay must be at most {MAX_RETRY_DELAY_MS} ms"
            )));
        }
        if parsed.brightness.is_some_and(|b| b > 100) {
            return Err(ConfigError::InvalidParams("triggerLamp: brightness must be 0-100".into()));
        }
        Ok(parsed)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.unwrap_or_default()
    }

    /// The state the light should end up in.  `on` defaults to whether a
    /// colour was given; colour and brightness only apply while on.
    pub fn target_state(&self) -> LightState {
        let on = self.on.unwrap_or(self.rgb.is_some());
        LightState {
            on,
            rgb: self.rgb.filter(|_| on),
            brightness: on.then(|| self.brightness.unwrap_or(DEFAULT_BRIGHTNESS)),
            transition_ms: Some(ON_TRANSITION_MS),
        }
    }
}

/// Apply `params` to the light.  Device errors propagate unchanged.
pub async fn trigger_lamp<D: DevicePort, T: DelayPort>(
    params: &TriggerParams,
    device: &D,
    delay: &T,
) -> Result<(), DeviceError> {
    if let Some(raw) = &params.state {
        log::debug!("triggerLamp {}: raw state", params.bulb);
        return device.set_state(&params.bulb, &StateDescriptor::Raw(raw.clone())).await;
    }

    let retry = params.retry_policy();
    let off = StateDescriptor::Semantic(LightState::off(OFF_TRANSITION_MS));
    let target = StateDescriptor::Semantic(params.target_state());

    for attempt in 0..retry.count {
        if attempt > 0 {
            device.set_state(&params.bulb, &off).await?;
            delay.delay_ms(retry.delay.saturating_add(u64::from(OFF_TRANSITION_MS))).await;
        }
        device.set_state(&params.bulb, &target).await?;
        delay.delay_ms(u64::from(ON_TRANSITION_MS)).await;
    }
    Ok(())
}
