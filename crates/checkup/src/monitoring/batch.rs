use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use super::executor::ProbeExecutor;
use super::types::{ProbeOutcome, TargetRef};

/// Batch runner - fans a set of targets out to the executor and waits for all
#[derive(Clone)]
pub struct BatchRunner {
    executor: Arc<ProbeExecutor>,
}

impl BatchRunner {
    pub fn new(executor: Arc<ProbeExecutor>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &Arc<ProbeExecutor> {
        &self.executor
    }

    /// Probe every target concurrently.
    ///
    /// Returns exactly one outcome per target, in input order. A probe task
    /// that panics yields the sentinel for its target.
    pub async fn run(&self, targets: &[TargetRef]) -> Vec<ProbeOutcome> {
        let handles: Vec<_> = targets
            .iter()
            .cloned()
            .map(|target| {
                let executor = self.executor.clone();
                tokio::spawn(async move { executor.probe(&target).await })
            })
            .collect();

        let outcomes: Vec<ProbeOutcome> = join_all(handles)
            .await
            .into_iter()
            .zip(targets)
            .map(|(joined, target)| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(target_id = %target.id, "probe task aborted: {e}");
                    ProbeOutcome::sentinel(target.id.clone())
                }
            })
            .collect();

        debug!(
            total = outcomes.len(),
            failed = outcomes.iter().filter(|o| o.is_sentinel()).count(),
            "batch finished"
        );

        outcomes
    }
}
