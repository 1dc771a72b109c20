//! Sentry issue checker.
//!
//! Pulls the project's issues from the last 24 h and classifies the
//! project by the most severe issue seen within the last `timeout`
//! minutes (default 2):
//!
//! | Level     | Rank |
//! |-----------|------|
//! | `fatal`   | 0    |
//! | `error`   | 1    |
//! | `warning` | 2    |
//! | `info`    | 3    |
//! | other     | 4    |
//!
//! The state is the selected issue's level, or `clear` when nothing recent
//! was seen.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Classification, STATE_CLEAR};
use crate::error::CheckerError;
use crate::merge::Fragment;

/// `module` value selecting this checker.
pub const MODULE_NAME: &str = "sentry";

/// Default recency window in minutes.
pub const DEFAULT_TIMEOUT_MINUTES: f64 = 2.0;

/// Issues are fetched for the last 24 h; a longer window sees nothing more.
pub const MAX_TIMEOUT_MINUTES: f64 = 24.0 * 60.0;

/// Settings read from the resolved checker config.
#[derive(Debug, Clone, PartialEq)]
pub struct SentrySettings {
    /// Organisation slug.
    pub user: String,
    pub project: String,
    pub token: String,
    pub timeout_minutes: f64,
}

impl SentrySettings {
    pub fn from_fragment(config: &Fragment) -> Result<Self, CheckerError> {
        #[derive(Deserialize)]
        struct Raw {
            user: Option<String>,
            project: Option<String>,
            token: Option<String>,
            timeout: Option<f64>,
        }
        let raw: Raw = serde_json::from_value(Value::Object(config.clone()))
            .map_err(|e| CheckerError::Decode(format!("sentry config: {e}")))?;
        let timeout_minutes = raw.timeout.unwrap_or(DEFAULT_TIMEOUT_MINUTES);
        if !(0.0..=MAX_TIMEOUT_MINUTES).contains(&timeout_minutes) {
            return Err(CheckerError::Decode(format!(
                "sentry config: timeout must be 0-{MAX_TIMEOUT_MINUTES} minutes, got {timeout_minutes}"
            )));
        }
        Ok(Self {
            user: raw.user.ok_or(CheckerError::MissingSetting("user"))?,
            project: raw.project.ok_or(CheckerError::MissingSetting("project"))?,
            token: raw.token.ok_or(CheckerError::MissingSetting("token"))?,
            timeout_minutes,
        })
    }
}

/// Where issues come from.  The production source is the Sentry REST API.
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    /// Issues of the last 24 h, most recently seen first.
    async fn recent_issues(&self, settings: &SentrySettings) -> Result<Vec<Value>, CheckerError>;
}

pub struct SentryChecker<S> {
    source: S,
}

impl<S: IssueSource> SentryChecker<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn check(&self, config: &Fragment) -> Result<Classification, CheckerError> {
        let settings = SentrySettings::from_fragment(config)?;
        let issues = self.source.recent_issues(&settings).await?;
        Ok(classify(&settings, &issues, Utc::now()))
    }
}

fn level_rank(level: &str) -> u8 {
    match level {
        "fatal" => 0,
        "error" => 1,
        "warning" => 2,
        "info" => 3,
        _ => 4,
    }
}

fn last_seen(issue: &Value) -> Option<DateTime<Utc>> {
    let text = issue.get("lastSeen")?.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Classify a batch of issues as of `now`.
pub fn classify(settings: &SentrySettings, issues: &[Value], now: DateTime<Utc>) -> Classification {
    let mut result = Classification::new(STATE_CLEAR)
        .with("user", json!(settings.user))
        .with("project", json!(settings.project))
        .with("errors", json!([]))
        .with("error", Value::Null);

    if issues.is_empty() {
        return result;
    }

    let minutes = settings.timeout_minutes.clamp(0.0, MAX_TIMEOUT_MINUTES);
    let last_check = TimeDelta::try_milliseconds((minutes * 60_000.0) as i64)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let summary: Vec<Value> = issues
        .iter()
        .map(|i| json!({ "lastSeen": i.get("lastSeen"), "level": i.get("level") }))
        .collect();

    let selected = issues
        .iter()
        .filter(|i| last_seen(i).is_some_and(|t| t >= last_check))
        .filter_map(|i| i.get("level").and_then(Value::as_str).map(|level| (level, i)))
        .min_by_key(|(level, _)| level_rank(level));

    if let Some((level, issue)) = selected {
        result.state = level.to_string();
        result = result.with("error", issue.clone());
    }

    result
        .with("errors", Value::Array(summary))
        .with("lastCheck", json!(last_check.to_rfc3339()))
}
