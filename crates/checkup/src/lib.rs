//! Checkup - liveness checks for HTTP targets
//!
//! Probes active targets concurrently with bounded timeouts, records one
//! measurement per probe and keeps each target's current state. The same
//! pipeline serves the in-process sweep and the remote agent protocol.

pub mod config;
pub mod database;
pub mod error;
pub mod monitoring;
pub mod orchestrator;
pub mod pool;
pub mod protocol;
pub mod reconciler;

pub use database::{LibsqlStore, Store, initialize_database};
pub use error::{EngineError, StoreError};
pub use monitoring::{
    BatchRunner, ProbeExecutor, ProbeOutcome, Target, TargetId, TargetRef, TargetStatus,
};
pub use orchestrator::{CycleReport, Engine, TriggerState};
pub use reconciler::{ReconcileReport, Reconciler};
