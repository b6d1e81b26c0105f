/// Monitoring engine module - probes targets
///
/// This module is responsible for:
/// - Executing bounded-time HTTP checks
/// - Folding every failure into the sentinel outcome
/// - Fanning batches of targets out and back in
pub mod batch;
pub mod checker;
pub mod executor;
pub mod types;

pub use batch::BatchRunner;
pub use checker::{CLIENT_MARKER, Checker, DEFAULT_PROBE_TIMEOUT, HttpChecker};
pub use executor::ProbeExecutor;
pub use types::{
    Measurement, ProbeOutcome, StateUpdate, Target, TargetId, TargetRef, TargetStatus,
};
