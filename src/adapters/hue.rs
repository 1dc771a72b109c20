//! Philips Hue bridge adapter (REST API v1).
//!
//! | Port          | Call                                   |
//! |---------------|----------------------------------------|
//! | `set_state`   | `PUT  /api/<user>/lights/<id>/state`   |
//! | `light_status`| `GET  /api/<user>/lights/<id>`         |
//! | `lights`      | `GET  /api/<user>/lights`              |
//! | `discover`    | `GET  https://discovery.meethue.com/`  |
//! | `register`    | `POST /api` `{"devicetype": ...}`      |
//!
//! The bridge answers failures with HTTP 200 and a body like
//! `[{"error": {"type": 3, "description": "..."}}]`; [`bridge_error`]
//! turns those into [`DeviceError`]s.  Commands are throttled to the
//! bridge's documented ~10 light commands per second with a token bucket.

use core::cell::RefCell;
use core::time::Duration;

use async_io_mini::Timer;
use burster::Limiter;
use log::debug;
use reqwest::Method;
use reqwest::blocking::Client;
use serde_json::{Value, json};

use super::offload::offload;
use crate::app::ports::{DevicePort, PairingPort, Registration};
use crate::drivers::light_state::{LightId, StateDescriptor};
use crate::error::DeviceError;

/// Bridge error type for "resource not available".
const ERROR_NOT_AVAILABLE: u64 = 3;
/// Bridge error type for "link button not pressed".
const ERROR_LINK_BUTTON: u64 = 101;

const DISCOVERY_URL: &str = "https://discovery.meethue.com/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const THROTTLE_POLL: Duration = Duration::from_millis(20);

type Bucket = burster::TokenBucket<fn() -> Duration>;

fn build_client() -> Result<Client, DeviceError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| DeviceError::Transport(e.to_string()))
}

/// One blocking JSON round trip, run on a worker thread.
async fn call(client: &Client, method: Method, url: String, body: Option<Value>) -> Result<Value, DeviceError> {
    let client = client.clone();
    debug!("hue: {} {}", method, url);
    offload("hue-request", move || {
        let mut req = client.request(method, &url);
        if let Some(body) = &body {
            req = req.json(body);
        }
        let resp = req.send().map_err(|e| DeviceError::Transport(e.to_string()))?;
        resp.json::<Value>().map_err(|e| DeviceError::Decode(e.to_string()))
    })
    .await
    .unwrap_or_else(|| Err(DeviceError::Transport("request worker failed".into())))
}

/// First error entry of a bridge response, if any.
pub fn bridge_error(body: &Value) -> Option<DeviceError> {
    let error = body.as_array()?.iter().find_map(|item| item.get("error"))?;
    let kind = error.get("type").and_then(Value::as_u64).unwrap_or(0);
    let description = error
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(if kind == ERROR_NOT_AVAILABLE || description.contains("not available") {
        DeviceError::Unavailable(description)
    } else {
        DeviceError::Bridge { kind, description }
    })
}

fn checked(body: Value) -> Result<Value, DeviceError> {
    match bridge_error(&body) {
        Some(e) => Err(e),
        None => Ok(body),
    }
}

/// Light ids of a `GET /lights` body, numeric ids in numeric order.
pub fn light_ids(body: &Value) -> Vec<LightId> {
    let mut ids: Vec<&String> = body.as_object().map(|m| m.keys().collect()).unwrap_or_default();
    ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    });
    ids.into_iter().map(LightId::new).collect()
}

// ───────────────────────────────────────────────────────────────
// Light control
// ───────────────────────────────────────────────────────────────

/// Registered-user session against one bridge.
pub struct HueBridge {
    client: Client,
    base: String,
    throttle: RefCell<Bucket>,
}

impl HueBridge {
    pub fn new(host: &str, username: &str) -> Result<Self, DeviceError> {
        Ok(Self {
            client: build_client()?,
            base: format!("http://{host}/api/{username}"),
            throttle: RefCell::new(burster::TokenBucket::new_with_time_provider(
                10,
                10, // 10 commands per second, 10 burst capacity
                platform_now as fn() -> Duration,
            )),
        })
    }

    async fn acquire(&self) {
        while self.throttle.borrow_mut().try_consume(1).is_err() {
            Timer::after(THROTTLE_POLL).await;
        }
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, DeviceError> {
        self.acquire().await;
        let url = format!("{}/{}", self.base, path);
        checked(call(&self.client, method, url, body).await?)
    }
}

impl DevicePort for HueBridge {
    async fn set_state(&self, light: &LightId, state: &StateDescriptor) -> Result<(), DeviceError> {
        let path = format!("lights/{light}/state");
        self.request(Method::PUT, &path, Some(state.to_hue_body())).await?;
        Ok(())
    }

    async fn light_status(&self, light: &LightId) -> Result<Value, DeviceError> {
        let body = self.request(Method::GET, &format!("lights/{light}"), None).await?;
        body.get("state")
            .cloned()
            .ok_or_else(|| DeviceError::Decode(format!("light {light}: no state in response")))
    }

    async fn lights(&self) -> Result<Vec<LightId>, DeviceError> {
        let body = self.request(Method::GET, "lights", None).await?;
        Ok(light_ids(&body))
    }
}

fn platform_now() -> Duration {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

// ───────────────────────────────────────────────────────────────
// Pairing
// ───────────────────────────────────────────────────────────────

/// Unauthenticated bridge calls used by `init`.
pub struct HuePairing {
    client: Client,
}

impl HuePairing {
    pub fn new() -> Result<Self, DeviceError> {
        Ok(Self { client: build_client()? })
    }
}

impl PairingPort for HuePairing {
    async fn discover(&self) -> Result<String, DeviceError> {
        let body = call(&self.client, Method::GET, DISCOVERY_URL.into(), None).await?;
        body.as_array()
            .and_then(|bridges| bridges.iter().find_map(|b| b.get("internalipaddress")?.as_str()))
            .map(str::to_string)
            .ok_or_else(|| DeviceError::Unavailable("no bridge found on the local network".into()))
    }

    async fn register(&self, host: &str, device_type: &str) -> Result<Registration, DeviceError> {
        let body = call(
            &self.client,
            Method::POST,
            format!("http://{host}/api"),
            Some(json!({ "devicetype": device_type })),
        )
        .await?;
        parse_registration(&body)
    }
}

/// Interpret a `POST /api` response.
pub fn parse_registration(body: &Value) -> Result<Registration, DeviceError> {
    let username = body
        .as_array()
        .and_then(|items| items.iter().find_map(|i| i.get("success")?.get("username")?.as_str()));
    if let Some(username) = username {
        return Ok(Registration::Registered(username.to_string()));
    }
    match bridge_error(body) {
        Some(DeviceError::Bridge { kind, .. }) if kind == ERROR_LINK_BUTTON => {
            Ok(Registration::LinkButtonNotPressed)
        }
        Some(e) => Err(e),
        None => Err(DeviceError::Decode(format!("unexpected registration response: {body}"))),
    }
}
