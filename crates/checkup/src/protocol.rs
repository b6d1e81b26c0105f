//! Wire types for the remote agent protocol and the scheduler endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::monitoring::{ProbeOutcome, TargetId};

/// Pull endpoint: active targets as `[{ id, address }]`
pub const TARGETS_PATH: &str = "/api/worker/targets";
/// Push endpoint: results as `[{ targetId, statusCode, latencyMs }]`
pub const RESULTS_PATH: &str = "/api/worker/results";
/// Internal scheduler trigger
pub const CRON_PATH: &str = "/api/cron";

/// Highest status code accepted from a remote agent
const MAX_STATUS_CODE: u16 = 999;
/// Highest latency accepted from a remote agent (one hour)
pub const MAX_LATENCY_MS: u64 = 3_600_000;

/// One outcome reported by a remote agent.
///
/// The legacy field names `monitorId`, `status` and `latency` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOutcome {
    #[serde(alias = "monitorId")]
    pub target_id: TargetId,
    #[serde(alias = "status")]
    pub status_code: u16,
    #[serde(alias = "latency")]
    pub latency_ms: u64,
}

impl RemoteOutcome {
    pub fn validate(&self) -> Result<(), String> {
        if self.target_id.is_empty() {
            return Err("targetId must not be empty".to_string());
        }
        if self.status_code > MAX_STATUS_CODE {
            return Err(format!("statusCode {} out of range", self.status_code));
        }
        if self.latency_ms > MAX_LATENCY_MS {
            return Err(format!("latencyMs {} out of range", self.latency_ms));
        }
        Ok(())
    }

    pub fn into_outcome(self, received_at: DateTime<Utc>) -> ProbeOutcome {
        ProbeOutcome {
            target_id: self.target_id,
            status_code: self.status_code,
            latency_ms: self.latency_ms,
            observed_at: received_at,
        }
    }
}

impl From<&ProbeOutcome> for RemoteOutcome {
    fn from(outcome: &ProbeOutcome) -> Self {
        Self {
            target_id: outcome.target_id.clone(),
            status_code: outcome.status_code,
            latency_ms: outcome.latency_ms,
        }
    }
}

/// Push endpoint response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSummary {
    pub success: bool,
    pub processed: usize,
    #[serde(default)]
    pub rejected: usize,
}

/// Scheduler endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    pub monitors_checked: usize,
    pub timestamp: DateTime<Utc>,
}

impl CycleSummary {
    pub fn new(monitors_checked: usize, timestamp: DateTime<Utc>) -> Self {
        let message = (monitors_checked == 0).then(|| "No active monitors to check.".to_string());
        Self { message, monitors_checked, timestamp }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("expected a JSON array of results")]
    NotAnArray,
}

/// Valid outcomes of a push body plus the number of elements dropped
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub outcomes: Vec<ProbeOutcome>,
    pub rejected: usize,
}

/// Validate a push body element by element.
///
/// Only a body that is not an array is rejected as a whole; a malformed
/// element is counted and skipped so it cannot discard its valid siblings.
pub fn parse_push_batch(
    body: Value,
    received_at: DateTime<Utc>,
) -> Result<ParsedBatch, PayloadError> {
    let Value::Array(elements) = body else {
        return Err(PayloadError::NotAnArray);
    };

    let mut batch = ParsedBatch { outcomes: Vec::with_capacity(elements.len()), rejected: 0 };

    for (index, element) in elements.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RemoteOutcome>(element)
            .map_err(|e| e.to_string())
            .and_then(|outcome| outcome.validate().map(|()| outcome));

        match parsed {
            Ok(outcome) => batch.outcomes.push(outcome.into_outcome(received_at)),
            Err(reason) => {
                debug!(index, "rejected push element: {reason}");
                batch.rejected += 1;
            }
        }
    }

    Ok(batch)
}
