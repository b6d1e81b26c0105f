use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

use super::checker::{Checker, HttpChecker};
use super::types::{ProbeOutcome, TargetRef};

/// Probe executor - performs one bounded-time check per target and never fails
pub struct ProbeExecutor {
    checker: Arc<dyn Checker>,
    timeout: Duration,
}

impl ProbeExecutor {
    /// Create an executor backed by the HTTP checker
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self::with_checker(Arc::new(HttpChecker::new(timeout)?), timeout))
    }

    /// Create an executor around an arbitrary checker
    pub fn with_checker(checker: Arc<dyn Checker>, timeout: Duration) -> Self {
        Self { checker, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one target. Every failure mode (refused, DNS, timeout, transport)
    /// comes back as the sentinel outcome.
    pub async fn probe(&self, target: &TargetRef) -> ProbeOutcome {
        let start = Instant::now();

        match timeout(self.timeout, self.checker.check(&target.address)).await {
            Ok(Ok(status_code)) => {
                let latency_ms = round_millis(start.elapsed());
                debug!(target_id = %target.id, status_code, latency_ms, "probe completed");
                ProbeOutcome::new(target.id.clone(), status_code, latency_ms)
            }
            Ok(Err(e)) => {
                debug!(target_id = %target.id, address = %target.address, "probe failed: {e}");
                ProbeOutcome::sentinel(target.id.clone())
            }
            Err(_) => {
                debug!(target_id = %target.id, address = %target.address, "probe timed out");
                ProbeOutcome::sentinel(target.id.clone())
            }
        }
    }
}

/// Elapsed time rounded to the nearest millisecond
fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}
