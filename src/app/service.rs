//! Application service — the hexagonal core.
//!
//! [`AppService`] ties the config document to the checker, device, delay
//! and event ports.  One run processes every selected checker entry
//! concurrently; a failing entry is reported and never stops its siblings.
//!
//! ```text
//!  CheckerPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │        AppService         │
//!   DevicePort ◀── │ classify · resolve · act  │ ◀── DelayPort
//!                  └──────────────────────────┘
//! ```

use core::convert::Infallible;

use edge_executor::LocalExecutor;
use log::info;
use rand::Rng;

use crate::actions::ping::{self, PingOutcome};
use crate::actions::{ActionOutcome, ActionRequest, party};
use crate::checkers::{Classification, run_checker};
use crate::config::{CheckerEntry, NotifierConfig};
use crate::dispatch::{StateSource, resolve_and_dispatch};
use crate::drivers::light_state::LightId;
use crate::error::{ConfigError, DeviceError, Result};

use super::commands::RunRequest;
use super::events::AppEvent;
use super::ports::{CheckerPort, DelayPort, DevicePort, EventSink};

/// Upper bound on checker entries processed in one run (executor queue size).
pub const MAX_TASKS: usize = 64;

// ───────────────────────────────────────────────────────────────
// Run reports
// ───────────────────────────────────────────────────────────────

/// What one checker entry's pipeline ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    /// Module-only run: the classification, nothing dispatched.
    Classified(Classification),
    /// `state` was resolved to `request` and executed.
    Dispatched {
        state: String,
        request: ActionRequest,
        outcome: ActionOutcome,
    },
}

#[derive(Debug, Clone)]
pub struct EntryReport {
    pub key: String,
    pub result: Result<EntryOutcome>,
}

/// Per-entry results of one run, in checker key order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub entries: Vec<EntryReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn entry(&self, key: &str) -> Option<&EntryReport> {
        self.entries.iter().find(|e| e.key == key)
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
///
/// Every port is borrowed, so concurrently running entries share the same
/// adapters.
pub struct AppService<'a, C, D, T, S> {
    config: &'a NotifierConfig,
    checkers: &'a C,
    device: &'a D,
    delay: &'a T,
    sink: &'a S,
}

impl<'a, C, D, T, S> AppService<'a, C, D, T, S>
where
    C: CheckerPort,
    D: DevicePort,
    T: DelayPort,
    S: EventSink,
{
    pub fn new(config: &'a NotifierConfig, checkers: &'a C, device: &'a D, delay: &'a T, sink: &'a S) -> Self {
        Self {
            config,
            checkers,
            device,
            delay,
            sink,
        }
    }

    // ── Checker runs ──────────────────────────────────────────

    /// Run the selected checker entries once, concurrently.
    ///
    /// Only request-level problems (an unknown `--check` key, too many
    /// entries) are errors here; per-entry failures land in the report.
    pub async fn run(&self, request: &RunRequest) -> core::result::Result<RunReport, ConfigError> {
        let selected = self.select(request)?;
        if selected.len() > MAX_TASKS {
            return Err(ConfigError::ValidationFailed(format!(
                "{} checkers configured, at most {} per run",
                selected.len(),
                MAX_TASKS
            )));
        }

        self.sink.emit(&AppEvent::RunStarted {
            checkers: selected.len(),
        });

        let executor: LocalExecutor<'_, MAX_TASKS> = LocalExecutor::new();
        let tasks: Vec<_> = selected
            .into_iter()
            .map(|(key, entry)| executor.spawn(self.run_entry(key, entry, request)))
            .collect();

        let entries = executor
            .run(async move {
                let mut entries = Vec::with_capacity(tasks.len());
                for task in tasks {
                    entries.push(task.await);
                }
                entries
            })
            .await;

        let report = RunReport { entries };
        self.sink.emit(&AppEvent::RunFinished {
            succeeded: report.succeeded(),
            failed: report.failed(),
        });
        Ok(report)
    }

    /// Repeat [`run`](Self::run) every `interval_secs`, forever.
    pub async fn run_every(&self, request: &RunRequest, interval_secs: u64) -> core::result::Result<Infallible, ConfigError> {
        loop {
            let report = self.run(request).await?;
            info!(
                "next run in {}s ({} ok, {} failed)",
                interval_secs,
                report.succeeded(),
                report.failed()
            );
            self.delay.delay_ms(interval_secs.saturating_mul(1000)).await;
        }
    }

    fn select(&self, request: &RunRequest) -> core::result::Result<Vec<(&'a str, &'a CheckerEntry)>, ConfigError> {
        let checkers = &self.config.checkers;
        match &request.check {
            Some(key) => checkers
                .get_key_value(key.as_str())
                .map(|(k, entry)| vec![(k.as_str(), entry)])
                .ok_or_else(|| ConfigError::UnknownChecker(key.clone())),
            None => Ok(checkers.iter().map(|(k, entry)| (k.as_str(), entry)).collect()),
        }
    }

    async fn run_entry(&self, key: &str, entry: &CheckerEntry, request: &RunRequest) -> EntryReport {
        self.sink.emit(&AppEvent::Processing {
            key: key.to_string(),
            label: entry.label().to_string(),
        });

        let result = self.process(key, entry, request).await;
        match &result {
            Ok(EntryOutcome::Dispatched { state, request, .. }) => self.sink.emit(&AppEvent::Dispatched {
                key: key.to_string(),
                state: state.clone(),
                callback: request.callback,
            }),
            Ok(EntryOutcome::Classified(_)) => {}
            Err(error) => self.sink.emit(&AppEvent::EntryFailed {
                key: key.to_string(),
                error: error.clone(),
            }),
        }

        EntryReport {
            key: key.to_string(),
            result,
        }
    }

    async fn process(&self, key: &str, entry: &CheckerEntry, request: &RunRequest) -> Result<EntryOutcome> {
        let shared = &self.config.states;

        if let Some(state) = &request.state {
            let (action, outcome) =
                resolve_and_dispatch(entry, shared, StateSource::Forced(state), self.device, self.delay).await?;
            return Ok(EntryOutcome::Dispatched {
                state: state.clone(),
                request: action,
                outcome,
            });
        }

        let classification = run_checker(self.checkers, key, entry, &self.config.configs).await?;
        self.sink.emit(&AppEvent::Classified {
            key: key.to_string(),
            classification: classification.clone(),
        });

        if request.module_only {
            return Ok(EntryOutcome::Classified(classification));
        }

        let (action, outcome) = resolve_and_dispatch(
            entry,
            shared,
            StateSource::Classified(&classification),
            self.device,
            self.delay,
        )
        .await?;
        Ok(EntryOutcome::Dispatched {
            state: classification.state,
            request: action,
            outcome,
        })
    }

    // ── Diagnostics ───────────────────────────────────────────

    pub async fn ping(&self, light: &LightId) -> core::result::Result<PingOutcome, DeviceError> {
        let outcome = ping::ping_lamp(light, self.device, self.delay).await?;
        self.report_ping(&outcome);
        Ok(outcome)
    }

    pub async fn ping_all(&self) -> core::result::Result<Vec<(LightId, PingOutcome)>, DeviceError> {
        let outcomes = ping::ping_all(self.device, self.delay).await?;
        for (_, outcome) in &outcomes {
            self.report_ping(outcome);
        }
        Ok(outcomes)
    }

    pub async fn party<R: Rng>(&self, rng: &mut R) -> core::result::Result<(), DeviceError> {
        party::party(self.device, self.delay, rng).await
    }

    fn report_ping(&self, outcome: &PingOutcome) {
        if let PingOutcome::Unavailable { light, available } = outcome {
            self.sink.emit(&AppEvent::LightUnavailable {
                light: light.clone(),
                available: available.clone(),
            });
        }
    }
}
