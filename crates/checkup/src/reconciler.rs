//! Turns probe outcomes into persisted measurements and current state.
//!
//! Every outcome is an independent unit: its measurement is appended, then
//! its target's current state is overwritten. A target deleted in between is
//! a no-op for that target. Only store unavailability fails the batch, and
//! only after every unit has run, so writes committed for other targets stand.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::database::Store;
use crate::error::{EngineError, StoreError};
use crate::monitoring::{Measurement, ProbeOutcome, StateUpdate};

/// Counts produced by one reconciliation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Outcomes handed in
    pub processed: usize,
    /// Measurements appended
    pub measurements: usize,
    /// Targets whose current state was overwritten
    pub updated: usize,
    /// Targets that no longer existed
    pub missing: usize,
    /// Non-fatal per-target store errors
    pub failed: usize,
}

#[derive(Default)]
struct UnitOutcome {
    appended: bool,
    updated: bool,
    missing: bool,
    failed: bool,
    fatal: Option<StoreError>,
}

impl UnitOutcome {
    fn record_error(&mut self, err: StoreError) {
        if err.is_fatal() {
            self.fatal.get_or_insert(err);
        } else {
            self.failed = true;
        }
    }
}

pub struct Reconciler {
    store: Arc<dyn Store>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reconcile a batch of outcomes
    pub async fn reconcile(
        &self,
        outcomes: &[ProbeOutcome],
    ) -> Result<ReconcileReport, EngineError> {
        let units = join_all(outcomes.iter().map(|outcome| self.reconcile_one(outcome))).await;

        let mut report = ReconcileReport { processed: outcomes.len(), ..Default::default() };
        let mut fatal = None;

        for unit in units {
            report.measurements += usize::from(unit.appended);
            report.updated += usize::from(unit.updated);
            report.missing += usize::from(unit.missing);
            report.failed += usize::from(unit.failed);
            if fatal.is_none() {
                fatal = unit.fatal;
            }
        }

        if let Some(err) = fatal {
            error!(?report, "reconciliation aborted, store unavailable: {err}");
            return Err(err.into());
        }

        debug!(?report, "reconciliation finished");
        Ok(report)
    }

    async fn reconcile_one(&self, outcome: &ProbeOutcome) -> UnitOutcome {
        let mut unit = UnitOutcome::default();
        let now = Utc::now();

        match self.store.append_measurement(&Measurement::from_outcome(outcome, now)).await {
            Ok(_) => unit.appended = true,
            Err(err) => {
                warn!(target_id = %outcome.target_id, "failed to append measurement: {err}");
                unit.record_error(err);
                if unit.fatal.is_some() {
                    return unit;
                }
            }
        }

        let update = StateUpdate::from_outcome(outcome, now);
        match self.store.update_target_state(&outcome.target_id, &update).await {
            Ok(()) => unit.updated = true,
            Err(StoreError::TargetNotFound(id)) => {
                debug!(target_id = %id, "target vanished before its state could be updated");
                unit.missing = true;
            }
            Err(err) => {
                warn!(target_id = %outcome.target_id, "failed to update target state: {err}");
                unit.record_error(err);
            }
        }

        unit
    }
}
