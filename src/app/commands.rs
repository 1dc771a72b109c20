//! Inbound commands to the application service.
//!
//! These represent what the operator asked for on the command line; the
//! binary maps each onto [`AppService`](super::service::AppService) calls.

use crate::drivers::light_state::LightId;

/// Parameters of one run over the configured checkers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Only run the checker with this key.
    pub check: Option<String>,
    /// Print classifications, do not dispatch.
    pub module_only: bool,
    /// Skip the checker module and dispatch this state directly.
    pub state: Option<String>,
}

/// Commands the outside world can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Run checkers once.
    Run(RunRequest),

    /// Run checkers forever, one run every `interval_secs`.
    Watch { request: RunRequest, interval_secs: u64 },

    /// Diagnostic flash of one light.
    Ping(LightId),

    /// Diagnostic flash of every light.
    PingAll,

    /// Random colours on every light.
    Party,

    /// Pair with a bridge and write a starter config.
    Init { bridge: Option<String> },
}
