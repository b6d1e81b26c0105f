use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a monitored target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TargetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Liveness of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetStatus {
    Pending,
    Up,
    Down,
}

impl TargetStatus {
    /// Classify a probe status code. `[200, 400)` is up, everything else
    /// (including the 0 sentinel) is down.
    pub fn classify(status_code: u16) -> Self {
        if (200..400).contains(&status_code) { TargetStatus::Up } else { TargetStatus::Down }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, TargetStatus::Up)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Pending => "PENDING",
            TargetStatus::Up => "UP",
            TargetStatus::Down => "DOWN",
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TargetStatus::Pending),
            "UP" => Ok(TargetStatus::Up),
            "DOWN" => Ok(TargetStatus::Down),
            other => Err(format!("unknown target status: {other}")),
        }
    }
}

/// Full target record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    pub url: String,
    pub owner_id: Option<String>,
    pub active: bool,
    pub status: TargetStatus,
    pub last_check: Option<DateTime<Utc>>,
    pub last_latency_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Target {
    /// Create a new, active target in the PENDING state
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: TargetId::generate(),
            name: name.into(),
            url: url.into(),
            owner_id: None,
            active: true,
            status: TargetStatus::Pending,
            last_check: None,
            last_latency_ms: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn to_ref(&self) -> TargetRef {
        TargetRef { id: self.id.clone(), address: self.url.clone() }
    }
}

/// The slice of a target the probe paths need: id and address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub id: TargetId,
    #[serde(alias = "url")]
    pub address: String,
}

impl TargetRef {
    pub fn new(id: impl Into<TargetId>, address: impl Into<String>) -> Self {
        Self { id: id.into(), address: address.into() }
    }
}

/// Normalized result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub target_id: TargetId,
    /// Observed status code, 0 when the probe did not complete
    pub status_code: u16,
    /// Elapsed milliseconds, 0 when the probe did not complete
    pub latency_ms: u64,
    pub observed_at: DateTime<Utc>,
}

impl ProbeOutcome {
    pub fn new(target_id: TargetId, status_code: u16, latency_ms: u64) -> Self {
        Self { target_id, status_code, latency_ms, observed_at: Utc::now() }
    }

    /// The (0, 0) outcome every probe failure mode collapses into
    pub fn sentinel(target_id: TargetId) -> Self {
        Self::new(target_id, 0, 0)
    }

    pub fn is_sentinel(&self) -> bool {
        self.status_code == 0
    }

    pub fn status(&self) -> TargetStatus {
        TargetStatus::classify(self.status_code)
    }
}

/// Append-only record of one probe outcome ("ping")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: Option<i64>,
    pub target_id: TargetId,
    pub status_code: u16,
    pub latency_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl Measurement {
    pub fn from_outcome(outcome: &ProbeOutcome, created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            target_id: outcome.target_id.clone(),
            status_code: outcome.status_code,
            latency_ms: outcome.latency_ms,
            created_at,
        }
    }
}

/// New current-state values for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateUpdate {
    pub status: TargetStatus,
    pub last_check: DateTime<Utc>,
    pub last_latency_ms: u64,
}

impl StateUpdate {
    pub fn from_outcome(outcome: &ProbeOutcome, last_check: DateTime<Utc>) -> Self {
        Self { status: outcome.status(), last_check, last_latency_ms: outcome.latency_ms }
    }
}
