//! `pingLamp`: diagnostic flash.
//!
//! Flashes the light blue four times so it can be found on the wall, then
//! puts it back the way it was if it had been on.  If the bridge says the
//! light does not exist, the ids it does know are reported instead.

use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::app::ports::{DelayPort, DevicePort};
use crate::drivers::light_state::{COLOUR_PING, LightId, LightState, StateDescriptor, writable_state};
use crate::error::{ConfigError, DeviceError};

pub const PING_FLASHES: u32 = 4;
pub const PING_ON_TRANSITION_MS: u32 = 100;
pub const PING_OFF_TRANSITION_MS: u32 = 800;
pub const PING_BRIGHTNESS: u8 = 80;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PingParams {
    pub bulb: LightId,
}

impl PingParams {
    pub fn from_value(params: &Value) -> Result<Self, ConfigError> {
        serde_json::from_value(params.clone()).map_err(|e| ConfigError::InvalidParams(format!("pingLamp: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingOutcome {
    Completed,
    /// The light is unknown to the bridge; these ones exist.
    Unavailable { light: LightId, available: Vec<LightId> },
}

/// Flash one light.  "Not available" is recovered into
/// [`PingOutcome::Unavailable`]; every other error propagates.
pub async fn ping_lamp<D: DevicePort, T: DelayPort>(
    light: &LightId,
    device: &D,
    delay: &T,
) -> Result<PingOutcome, DeviceError> {
    match flash(light, device, delay).await {
        Ok(()) => Ok(PingOutcome::Completed),
        Err(e) if e.is_unavailable() => {
            let available = device.lights().await?;
            warn!("light {} is not available ({})", light, e);
            info!(
                "available lights: {}",
                available.iter().map(LightId::as_str).collect::<Vec<_>>().join(", ")
            );
            Ok(PingOutcome::Unavailable {
                light: light.clone(),
                available,
            })
        }
        Err(e) => Err(e),
    }
}

async fn flash<D: DevicePort, T: DelayPort>(light: &LightId, device: &D, delay: &T) -> Result<(), DeviceError> {
    let original = device.light_status(light).await?;

    let on = StateDescriptor::Semantic(
        LightState::colour(COLOUR_PING, PING_BRIGHTNESS).with_transition(PING_ON_TRANSITION_MS),
    );
    let off = StateDescriptor::Semantic(LightState::off(PING_OFF_TRANSITION_MS));

    for _ in 0..PING_FLASHES {
        device.set_state(light, &on).await?;
        delay.delay_ms(u64::from(PING_ON_TRANSITION_MS)).await;
        device.set_state(light, &off).await?;
        delay.delay_ms(u64::from(PING_OFF_TRANSITION_MS)).await;
    }

    if original.get("on").and_then(Value::as_bool).unwrap_or(false) {
        device.set_state(light, &StateDescriptor::Raw(writable_state(&original))).await?;
    }
    Ok(())
}

/// Ping every light the bridge knows, one after another.
pub async fn ping_all<D: DevicePort, T: DelayPort>(
    device: &D,
    delay: &T,
) -> Result<Vec<(LightId, PingOutcome)>, DeviceError> {
    let lights = device.lights().await?;
    let mut outcomes = Vec::with_capacity(lights.len());
    for light in lights {
        info!("ping light #{}", light);
        let outcome = ping_lamp(&light, device, delay).await?;
        outcomes.push((light, outcome));
    }
    Ok(outcomes)
}
