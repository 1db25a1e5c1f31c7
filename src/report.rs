//! Machine-readable run summaries printed once per invocation

use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::release::selector::Selection;
use crate::sync::{SyncError, SyncOutcome};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub success: bool,
    pub policy_id: Option<String>,
    pub previous_version: Option<String>,
    pub new_version: Option<String>,
    pub latest_version: Option<String>,
    pub updated: bool,
    pub dry_run: bool,
    pub insufficient_history: bool,
    pub duration_seconds: f64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSummary {
    pub fn from_outcome(
        outcome: &SyncOutcome,
        dry_run: bool,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            policy_id: Some(outcome.policy_id.clone()),
            previous_version: outcome.previous_version.clone(),
            new_version: Some(outcome.selection.target_version()),
            latest_version: Some(outcome.selection.latest_version()),
            updated: outcome.updated(),
            dry_run,
            insufficient_history: outcome.selection.is_degraded(),
            duration_seconds: round_seconds(duration),
            timestamp: format_timestamp(now),
            error: None,
        }
    }

    pub fn failure(
        policy_id: Option<&str>,
        dry_run: bool,
        error: &dyn Display,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            success: false,
            policy_id: policy_id.map(str::to_string),
            previous_version: None,
            new_version: None,
            latest_version: None,
            updated: false,
            dry_run,
            insufficient_history: false,
            duration_seconds: round_seconds(duration),
            timestamp: format_timestamp(now),
            error: Some(error.to_string()),
        }
    }

    /// Failure summary that keeps whatever the run computed before failing
    pub fn from_error(
        policy_id: Option<&str>,
        dry_run: bool,
        error: &SyncError,
        duration: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let mut summary = Self::failure(policy_id, dry_run, error, duration, now);

        if let Some(selection) = error.selection() {
            summary.previous_version = error.previous_version().map(str::to_string);
            summary.new_version = Some(selection.target_version());
            summary.latest_version = Some(selection.latest_version());
            summary.insufficient_history = selection.is_degraded();
        }

        summary
    }
}

/// Output of the `target` command
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub target_version: String,
    pub target_build: String,
    pub latest_version: String,
    pub insufficient_history: bool,
}

impl From<&Selection> for TargetReport {
    fn from(selection: &Selection) -> Self {
        Self {
            target_version: selection.target_version(),
            target_build: selection.target.build.clone(),
            latest_version: selection.latest_version(),
            insufficient_history: selection.is_degraded(),
        }
    }
}

fn round_seconds(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}

fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}
