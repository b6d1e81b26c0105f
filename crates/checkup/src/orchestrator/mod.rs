/// Orchestrator module - the single check pipeline
///
/// Both trigger paths go through [`Engine`]:
/// - the internal sweep (HTTP scheduler call or in-process ticker) runs
///   target provider -> batch runner -> reconciler behind the IDLE/RUNNING gate
/// - the remote agent push hands already-probed outcomes to the same reconciler
pub mod trigger;


pub use trigger::{SweepTrigger, TriggerState};

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::database::Store;
use crate::error::EngineError;
use crate::monitoring::{BatchRunner, ProbeExecutor, ProbeOutcome, TargetRef};
use crate::reconciler::{ReconcileReport, Reconciler};

/// Summary of one internal sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub targets_checked: usize,
    pub up: usize,
    pub down: usize,
    pub reconcile: ReconcileReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct Engine {
    store: Arc<dyn Store>,
    runner: BatchRunner,
    reconciler: Reconciler,
    trigger: SweepTrigger,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>, executor: Arc<ProbeExecutor>) -> Self {
        Self {
            reconciler: Reconciler::new(store.clone()),
            runner: BatchRunner::new(executor),
            store,
            trigger: SweepTrigger::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.trigger.state()
    }

    /// Targets served to remote agents
    pub async fn active_targets(&self) -> Result<Vec<TargetRef>, EngineError> {
        Ok(self.store.active_targets().await?)
    }

    /// Run one internal sweep. Fails with [`EngineError::Busy`] while another
    /// sweep holds the trigger.
    pub async fn sweep(&self) -> Result<CycleReport, EngineError> {
        let _running = self.trigger.try_begin().ok_or(EngineError::Busy)?;
        let started_at = Utc::now();
        let clock = Instant::now();

        let targets = self.store.active_targets().await?;
        if targets.is_empty() {
            info!("No active monitors to check");
            return Ok(CycleReport {
                targets_checked: 0,
                up: 0,
                down: 0,
                reconcile: ReconcileReport::default(),
                started_at,
                finished_at: Utc::now(),
            });
        }

        info!(targets = targets.len(), "Starting check cycle");

        let outcomes = self.runner.run(&targets).await;
        let up = outcomes.iter().filter(|o| o.status().is_up()).count();
        let reconcile = self.reconciler.reconcile(&outcomes).await?;

        info!(
            targets = targets.len(),
            up,
            down = outcomes.len() - up,
            missing = reconcile.missing,
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "Check cycle finished"
        );

        Ok(CycleReport {
            targets_checked: targets.len(),
            up,
            down: outcomes.len() - up,
            reconcile,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Reconcile outcomes probed elsewhere (remote agent push)
    pub async fn ingest(&self, outcomes: &[ProbeOutcome]) -> Result<ReconcileReport, EngineError> {
        if outcomes.is_empty() {
            return Ok(ReconcileReport::default());
        }

        let report = self.reconciler.reconcile(outcomes).await?;
        info!(
            processed = report.processed,
            missing = report.missing,
            failed = report.failed,
            "Ingested remote results"
        );
        Ok(report)
    }

    /// Start the in-process sweep ticker
    pub fn start_periodic_sweep(self: &Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                match engine.sweep().await {
                    Ok(_) => {}
                    Err(EngineError::Busy) => {
                        warn!("Skipping scheduled sweep, previous cycle still running");
                    }
                    Err(e) => {
                        error!("Scheduled sweep failed: {}", e);
                    }
                }
            }
        })
    }
}
