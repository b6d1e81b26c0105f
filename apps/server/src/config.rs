use std::time::Duration;
use std::{fmt, path};

use checkup::config::{ConfigError, env_var, load_or_create};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "server.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: Http,
    pub database: Database,
    pub probe: Probe,
    pub scheduler: Scheduler,
    pub auth: Auth,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Http {
    pub bind: String,
    pub port: u16,
    /// Largest accepted request body, sized for a full fleet's result push
    pub max_payload_bytes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub path: String,
    pub pool_size: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Probe {
    pub timeout_ms: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheduler {
    /// Seconds between in-process sweeps, 0 leaves scheduling to `/api/cron`
    pub interval_seconds: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub cron_secret: Option<String>,
    pub worker_secret: Option<String>,
}

impl Default for Http {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080, max_payload_bytes: 16 * 1024 * 1024 }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self { path: "checkup.db".into(), pool_size: 16 }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self { timeout_ms: checkup::monitoring::DEFAULT_PROBE_TIMEOUT.as_millis() as u64 }
    }
}

impl Probe {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

impl Scheduler {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_seconds > 0).then(|| Duration::from_secs(self.interval_seconds))
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => "<set>",
        _ => "<unset>",
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Server Configuration State:")?;
        write_title_1(f, "HTTP")?;
        write_1(f, "Bind Address", &self.http.bind)?;
        write_1(f, "Port", &self.http.port)?;
        write_1(f, "Max Payload (bytes)", &self.http.max_payload_bytes)?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path)?;
        write_1(f, "Pool Size", &self.database.pool_size)?;
        write_title_1(f, "Probe")?;
        write_1(f, "Timeout (ms)", &self.probe.timeout_ms)?;
        write_title_1(f, "Scheduler")?;
        write_1(f, "Interval (s)", &self.scheduler.interval_seconds)?;
        write_title_1(f, "Auth")?;
        write_1(f, "Cron Secret", &redact(&self.auth.cron_secret))?;
        write_1(f, "Worker Secret", &redact(&self.auth.worker_secret))?;

        Ok(())
    }
}

impl Config {
    /// Load `server.toml` (creating it with defaults when missing) and apply
    /// environment overrides
    pub fn from_config(optional_path: Option<&path::Path>) -> Result<Self, ConfigError> {
        load_or_create::<Self>(optional_path, CONFIG_FILE).map(Self::with_env_overrides)
    }

    /// `CHECKUP_BIND`, `CHECKUP_PORT`, `CHECKUP_DATABASE_PATH`, `CRON_SECRET`
    /// and `WORKER_SECRET` win over the file
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bind) = env_var("CHECKUP_BIND") {
            self.http.bind = bind;
        }
        if let Some(port) = env_var("CHECKUP_PORT") {
            self.http.port = port;
        }
        if let Some(path) = env_var("CHECKUP_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(secret) = env_var("CRON_SECRET") {
            self.auth.cron_secret = Some(secret);
        }
        if let Some(secret) = env_var("WORKER_SECRET") {
            self.auth.worker_secret = Some(secret);
        }
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.http.bind, self.http.port)
    }
}
