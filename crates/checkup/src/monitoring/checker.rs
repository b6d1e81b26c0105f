use std::time::Duration;

use anyhow::{Result, anyhow};
use reqwest::header::{CACHE_CONTROL, PRAGMA};

/// User agent sent by every probe, whichever path issues it
pub const CLIENT_MARKER: &str = "Checkup/1.0";

/// Upper bound on a single probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Checker trait for the network retrieval behind a probe
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    /// Perform one retrieval of `address` and return the observed status code
    async fn check(&self, address: &str) -> Result<u16>;
}

/// HTTP/HTTPS checker
pub struct HttpChecker {
    client: reqwest::Client,
}

impl HttpChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(CLIENT_MARKER)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Checker for HttpChecker {
    async fn check(&self, address: &str) -> Result<u16> {
        let response = self
            .client
            .get(address)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        Ok(response.status().as_u16())
    }
}
