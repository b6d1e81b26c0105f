use std::time::Duration;
use std::{fmt, path};

use checkup::config::{ConfigError, env_var, load_or_create};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "agent.toml";

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the checkup server
    pub api_base: String,
    pub worker_secret: Option<String>,
    pub timeout_ms: u64,
    /// Upper bound on one pull or push request to the server
    pub request_timeout_ms: u64,
    /// Seconds between cycles, 0 runs a single cycle and exits
    pub interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".into(),
            worker_secret: None,
            timeout_ms: checkup::monitoring::DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            request_timeout_ms: 30_000,
            interval_seconds: 60,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = match &self.worker_secret {
            Some(s) if !s.is_empty() => "<set>",
            _ => "<unset>",
        };

        writeln!(f, "Current Agent Configuration State:")?;
        writeln!(f, "  API Base: {}", self.api_base)?;
        writeln!(f, "  Worker Secret: {secret}")?;
        writeln!(f, "  Timeout (ms): {}", self.timeout_ms)?;
        writeln!(f, "  Request Timeout (ms): {}", self.request_timeout_ms)?;
        writeln!(f, "  Interval (s): {}", self.interval_seconds)
    }
}

impl Config {
    pub fn from_config(optional_path: Option<&path::Path>) -> Result<Self, ConfigError> {
        load_or_create::<Self>(optional_path, CONFIG_FILE).map(Self::with_env_overrides)
    }

    /// `CHECKUP_API_BASE` and `WORKER_SECRET` win over the file
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(base) = env_var("CHECKUP_API_BASE") {
            self.api_base = base;
        }
        if let Some(secret) = env_var("WORKER_SECRET") {
            self.worker_secret = Some(secret);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn interval(&self) -> Option<Duration> {
        (self.interval_seconds > 0).then(|| Duration::from_secs(self.interval_seconds))
    }
}
