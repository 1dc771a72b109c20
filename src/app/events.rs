//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::actions::Callback;
use crate::checkers::Classification;
use crate::drivers::light_state::LightId;
use crate::error::Error;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A run over `checkers` entries is starting.
    RunStarted { checkers: usize },

    /// A checker entry's pipeline started.
    Processing { key: String, label: String },

    /// A checker module returned a classification.
    Classified { key: String, classification: Classification },

    /// A state was resolved and its action executed.
    Dispatched { key: String, state: String, callback: Callback },

    /// A checker entry's pipeline failed; siblings continue.
    EntryFailed { key: String, error: Error },

    /// All entries of a run have finished.
    RunFinished { succeeded: usize, failed: usize },

    /// A pinged light does not exist; these do.
    LightUnavailable { light: LightId, available: Vec<LightId> },
}
