/// Persistence layer
///
/// Targets and their measurements live in a local libsql (SQLite) database
/// reached through a deadpool-managed connection pool.
pub mod migrations;
pub mod models;
pub mod repository;

pub use repository::{LibsqlStore, Store};

use crate::error::StoreError;
use crate::pool::LibsqlPool;

/// Initialize database with schema
pub async fn initialize_database(pool: &LibsqlPool) -> Result<(), StoreError> {
    let conn = pool.get().await?;
    migrations::run_migrations(&conn).await
}
