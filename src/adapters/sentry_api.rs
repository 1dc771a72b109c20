//! Sentry REST adapter for the issue checker.
//!
//! `GET https://sentry.io/api/0/projects/<org>/<project>/issues/?statsPeriod=24h`
//! with a bearer token.  The response is a JSON array of issues, most
//! recently seen first.

use core::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde_json::Value;

use super::offload::offload;
use crate::checkers::sentry::{IssueSource, SentrySettings};
use crate::error::CheckerError;

const API_BASE: &str = "https://sentry.io/api/0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SentryApi {
    client: Client,
    base: String,
}

impl SentryApi {
    pub fn new() -> Result<Self, CheckerError> {
        Self::with_base(API_BASE)
    }

    /// Point at a self-hosted instance.
    pub fn with_base(base: &str) -> Result<Self, CheckerError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CheckerError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub fn issues_url(&self, settings: &SentrySettings) -> String {
        format!(
            "{}/projects/{}/{}/issues/?statsPeriod=24h",
            self.base, settings.user, settings.project
        )
    }
}

impl IssueSource for SentryApi {
    async fn recent_issues(&self, settings: &SentrySettings) -> Result<Vec<Value>, CheckerError> {
        let client = self.client.clone();
        let url = self.issues_url(settings);
        let token = settings.token.clone();
        debug!("sentry: GET {}", url);

        let body = offload("sentry-request", move || {
            client
                .get(&url)
                .bearer_auth(token)
                .send()
                .and_then(reqwest::blocking::Response::error_for_status)
                .map_err(|e| CheckerError::Request(e.to_string()))?
                .json::<Value>()
                .map_err(|e| CheckerError::Decode(e.to_string()))
        })
        .await
        .unwrap_or_else(|| Err(CheckerError::Request("request worker failed".into())))?;

        match body {
            Value::Array(issues) => Ok(issues),
            other => Err(CheckerError::Decode(format!("expected issue list, got {other}"))),
        }
    }
}
