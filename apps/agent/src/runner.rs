use std::time::{Duration, Instant};

use checkup::BatchRunner;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::client::{ClientError, ProtocolClient};

/// Result of one pull -> probe -> push cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgentCycle {
    pub pulled: usize,
    pub up: usize,
    pub processed: usize,
}

pub struct AgentRunner {
    client: ProtocolClient,
    runner: BatchRunner,
}

impl AgentRunner {
    pub fn new(client: ProtocolClient, runner: BatchRunner) -> Self {
        Self { client, runner }
    }

    pub async fn run_once(&self) -> Result<AgentCycle, ClientError> {
        let clock = Instant::now();
        let targets = self.client.pull_targets().await?;
        if targets.is_empty() {
            info!("Server has no active targets");
            return Ok(AgentCycle::default());
        }

        let outcomes = self.runner.run(&targets).await;
        let up = outcomes.iter().filter(|o| o.status().is_up()).count();
        let summary = self.client.push_results(&outcomes).await?;

        if summary.rejected > 0 {
            warn!(rejected = summary.rejected, "Server rejected part of the batch");
        }
        info!(
            pulled = targets.len(),
            up,
            down = outcomes.len() - up,
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "Agent cycle finished"
        );

        Ok(AgentCycle { pulled: targets.len(), up, processed: summary.processed })
    }

    /// Run cycles on a fixed period until the task is dropped. A failed cycle
    /// is logged and the next tick tries again.
    pub async fn run_every(&self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if let Err(e) = self.run_once().await {
                error!("Agent cycle failed: {e}");
            }
        }
    }
}
