use thiserror::Error;

use crate::monitoring::TargetId;

/// Errors raised by the persistent store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be obtained; fatal for the running cycle
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("target {0} not found")]
    TargetNotFound(TargetId),
    #[error("query failed: {0}")]
    Query(#[from] libsql::Error),
    #[error("invalid stored row: {0}")]
    Corrupt(String),
    #[error("value does not fit its column: {0}")]
    OutOfRange(String),
}

impl StoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<deadpool::managed::PoolError<libsql::Error>> for StoreError {
    fn from(err: deadpool::managed::PoolError<libsql::Error>) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Errors surfaced by a check cycle or an ingest
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("check cycle already running")]
    Busy,
    #[error(transparent)]
    Store(#[from] StoreError),
}
