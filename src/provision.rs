//! Bridge provisioning for `init`.
//!
//! ```text
//!   config exists? ──yes──▶ AlreadyExists
//!        │ no
//!        ▼
//!   host (given | discovered)
//!        │
//!        ▼
//!   register × 12, 2 s apart   ◀── press the bridge link button
//!        │
//!        ▼
//!   save starter config
//! ```

use log::{info, warn};

use crate::app::ports::{ConfigPort, DelayPort, PairingPort, Registration};
use crate::config::NotifierConfig;
use crate::error::{ConfigError, DeviceError, Result};

pub const REGISTRATION_ATTEMPTS: u32 = 12;
pub const REGISTRATION_INTERVAL_MS: u64 = 2000;
/// `devicetype` announced to the bridge (`<app>#<device>`).
pub const DEVICE_TYPE: &str = "light_notifier#cli";

/// Register with the bridge at `host` and return the username.
pub async fn register_user<P: PairingPort, T: DelayPort>(
    pairing: &P,
    delay: &T,
    host: &str,
) -> core::result::Result<String, DeviceError> {
    let mut last_error = None;
    for attempt in 1..=REGISTRATION_ATTEMPTS {
        delay.delay_ms(REGISTRATION_INTERVAL_MS).await;
        match pairing.register(host, DEVICE_TYPE).await {
            Ok(Registration::Registered(username)) => {
                info!("Provision: registered on {} (attempt {})", host, attempt);
                return Ok(username);
            }
            Ok(Registration::LinkButtonNotPressed) => {
                info!(
                    "Provision: press the link button on the bridge ({}/{})",
                    attempt, REGISTRATION_ATTEMPTS
                );
            }
            Err(e) => {
                warn!("Provision: attempt {}/{} failed: {}", attempt, REGISTRATION_ATTEMPTS, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or(DeviceError::Bridge {
        kind: 101,
        description: "link button not pressed".into(),
    }))
}

/// Pair with a bridge and write the starter config.
///
/// Refuses to run when a config document already exists, before any
/// network traffic.
pub async fn provision<P: PairingPort, T: DelayPort, C: ConfigPort>(
    pairing: &P,
    delay: &T,
    store: &C,
    host: Option<String>,
) -> Result<NotifierConfig> {
    if store.exists() {
        return Err(ConfigError::AlreadyExists("config document".into()).into());
    }

    let host = match host {
        Some(host) => host,
        None => {
            let found = pairing.discover().await?;
            info!("Provision: found bridge at {}", found);
            found
        }
    };

    let username = register_user(pairing, delay, &host).await?;
    let config = NotifierConfig::template(Some(host), Some(username));
    store.save(&config)?;
    Ok(config)
}
