//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in the binary).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::drivers::light_state::LightId;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::RunStarted { checkers } => {
                info!("RUN   | started, {} checker(s)", checkers);
            }
            AppEvent::Processing { key, label } => {
                info!("CHECK | #{}: {}", key, label);
            }
            AppEvent::Classified { key, classification } => {
                let data = serde_json::to_string(classification).unwrap_or_default();
                info!("CHECK | #{} -> {}", key, data);
            }
            AppEvent::Dispatched { key, state, callback } => {
                info!("STATE | #{} '{}' -> {}", key, state, callback);
            }
            AppEvent::EntryFailed { key, error: e } => {
                error!("FAIL  | #{}: {}", key, e);
            }
            AppEvent::RunFinished { succeeded, failed } => {
                info!("RUN   | finished, ok={} failed={}", succeeded, failed);
            }
            AppEvent::LightUnavailable { light, available } => {
                let ids: Vec<&str> = available.iter().map(LightId::as_str).collect();
                warn!("LIGHT | #{} not available, known: [{}]", light, ids.join(", "));
            }
        }
    }
}
