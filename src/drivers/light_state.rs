//! Light state descriptors and their Hue wire encoding.
//!
//! A [`LightState`] is the semantic request (on/off, colour, brightness,
//! transition).  [`LightState::to_hue_body`] turns it into the JSON body of
//! `PUT /api/<user>/lights/<id>/state`:
//!
//! | Field            | Hue key          | Encoding                         |
//! |------------------|------------------|----------------------------------|
//! | `on`             | `on`             | bool                             |
//! | `brightness` (%) | `bri`            | 1–254                            |
//! | `rgb`            | `xy`             | CIE xy, gamma-corrected sRGB     |
//! | `transition_ms`  | `transitiontime` | multiples of 100 ms              |

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

/// Colour as (R, G, B), each 0–255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CIE 1931 xy chromaticity for this colour.
    ///
    /// Gamma-corrects each channel, then applies the wide-gamut D65 matrix.
    /// Black has no chromaticity and maps to `(0.0, 0.0)`.
    pub fn to_xy(self) -> (f64, f64) {
        fn linear(c: u8) -> f64 {
            let v = f64::from(c) / 255.0;
            if v > 0.040_45 {
                ((v + 0.055) / 1.055).powf(2.4)
            } else {
                v / 12.92
            }
        }
        let (r, g, b) = (linear(self.r), linear(self.g), linear(self.b));
        let x = r * 0.664_511 + g * 0.154_324 + b * 0.162_028;
        let y = r * 0.283_881 + g * 0.668_433 + b * 0.047_685;
        let z = r * 0.000_088 + g * 0.072_310 + b * 0.986_039;
        let sum = x + y + z;
        if sum <= f64::EPSILON {
            return (0.0, 0.0);
        }
        let round = |v: f64| (v * 10_000.0).round() / 10_000.0;
        (round(x / sum), round(y / sum))
    }
}

/// Bridge-side light identifier.
///
/// Configs write it either as a number (`"bulb": 8`) or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LightId(String);

impl LightId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LightId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// Semantic light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightState {
    pub on: bool,
    pub rgb: Option<Rgb>,
    /// Brightness percent, 0–100.
    pub brightness: Option<u8>,
    pub transition_ms: Option<u32>,
}

impl LightState {
    /// Switch off, fading over `transition_ms`.
    pub const fn off(transition_ms: u32) -> Self {
        Self {
            on: false,
            rgb: None,
            brightness: None,
            transition_ms: Some(transition_ms),
        }
    }

    /// Switch on with a colour and brightness percent.
    pub const fn colour(rgb: Rgb, brightness: u8) -> Self {
        Self {
            on: true,
            rgb: Some(rgb),
            brightness: Some(brightness),
            transition_ms: None,
        }
    }

    pub const fn with_transition(mut self, ms: u32) -> Self {
        self.transition_ms = Some(ms);
        self
    }

    /// Hue REST body.  Colour and brightness are only sent while on.
    pub fn to_hue_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("on".into(), Value::Bool(self.on));
        if self.on {
            if let Some(pct) = self.brightness {
                body.insert("bri".into(), json!(percent_to_bri(pct)));
            }
            if let Some(rgb) = self.rgb {
                let (x, y) = rgb.to_xy();
                body.insert("xy".into(), json!([x, y]));
            }
        }
        if let Some(ms) = self.transition_ms {
            body.insert("transitiontime".into(), json!(ms / 100));
        }
        Value::Object(body)
    }
}

/// What a device port is asked to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum StateDescriptor {
    Semantic(LightState),
    /// Opaque bridge state object, sent verbatim.
    Raw(Value),
}

impl StateDescriptor {
    pub fn to_hue_body(&self) -> Value {
        match self {
            Self::Semantic(state) => state.to_hue_body(),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

/// Map a brightness percent onto the bridge's 1–254 range.
pub fn percent_to_bri(percent: u8) -> u8 {
    let pct = u32::from(percent.min(100));
    ((pct * 254 + 50) / 100).clamp(1, 254) as u8
}

/// Bridge state keys that may be written back.  A status read returns more
/// (`reachable`, `colormode`, ...) which the bridge rejects on write.
const WRITABLE_KEYS: [&str; 6] = ["on", "bri", "hue", "sat", "xy", "ct"];

/// Keep only the writable fields of a light's `state` object.
pub fn writable_state(state: &Value) -> Value {
    let Some(obj) = state.as_object() else {
        return Value::Object(Map::new());
    };
    Value::Object(
        obj.iter()
            .filter(|(k, _)| WRITABLE_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

// ── Well-known colours ───────────────────────────────────────

pub const COLOUR_PING: Rgb = Rgb::new(20, 20, 255);
pub const COLOUR_ERROR: Rgb = Rgb::new(255, 0, 0);

/// Colours cycled by the `party` command.
pub const PARTY_PALETTE: [Rgb; 6] = [
    Rgb::new(255, 0, 0),   // red
    Rgb::new(0, 255, 0),   // green
    Rgb::new(0, 0, 255),   // blue
    Rgb::new(255, 100, 0), // orange
    Rgb::new(255, 0, 100), // pink
    Rgb::new(0, 255, 100), // mint
];
