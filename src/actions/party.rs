//! `party`: cycle every light through random palette colours.

use log::info;
use rand::Rng;

use crate::app::ports::{DelayPort, DevicePort};
use crate::drivers::light_state::{LightState, PARTY_PALETTE, StateDescriptor};
use crate::error::DeviceError;

pub const PARTY_ROUNDS: u32 = 10;
pub const PARTY_STEP_MS: u64 = 150;

pub async fn party<D: DevicePort, T: DelayPort, R: Rng>(device: &D, delay: &T, rng: &mut R) -> Result<(), DeviceError> {
    let lights = device.lights().await?;

    for round in (1..=PARTY_ROUNDS).rev() {
        info!("party: {} rounds left", round);
        for light in &lights {
            let colour = PARTY_PALETTE[rng.gen_range(0..PARTY_PALETTE.len())];
            let state = LightState {
                on: true,
                rgb: Some(colour),
                brightness: None,
                transition_ms: None,
            };
            device.set_state(light, &StateDescriptor::Semantic(state)).await?;
            delay.delay_ms(PARTY_STEP_MS).await;
        }
    }
    Ok(())
}
