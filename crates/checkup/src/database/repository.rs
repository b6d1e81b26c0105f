use async_trait::async_trait;
use libsql::params;

use super::models::{
    PING_COLUMNS, TARGET_COLUMNS, latency_to_sql, measurement_from_row, target_from_row,
    timestamp_to_millis,
};
use crate::error::StoreError;
use crate::monitoring::{Measurement, StateUpdate, Target, TargetId, TargetRef};
use crate::pool::{LibsqlManager, LibsqlPool};

/// Persistent store seen by the engine.
///
/// `active_targets` is the target provider; `append_measurement` and
/// `update_target_state` are the reconciler's only writes. The remaining
/// methods are the boundary used by the dashboard side and by tests.
#[async_trait]
pub trait Store: Send + Sync {
    /// Id and address of every active target
    async fn active_targets(&self) -> Result<Vec<TargetRef>, StoreError>;

    /// Full records of every target owned by `owner_id`
    async fn targets_for_owner(&self, owner_id: &str) -> Result<Vec<Target>, StoreError>;

    /// Fetch one target
    async fn get_target(&self, id: &TargetId) -> Result<Option<Target>, StoreError>;

    /// Append a measurement to the log
    async fn append_measurement(&self, measurement: &Measurement) -> Result<i64, StoreError>;

    /// Overwrite a target's current state.
    ///
    /// Returns [`StoreError::TargetNotFound`] when the target no longer exists.
    async fn update_target_state(
        &self,
        id: &TargetId,
        update: &StateUpdate,
    ) -> Result<(), StoreError>;

    /// Most recent measurements for a target, newest first
    async fn recent_measurements(
        &self,
        id: &TargetId,
        limit: usize,
    ) -> Result<Vec<Measurement>, StoreError>;

    /// Insert a new target
    async fn insert_target(&self, target: &Target) -> Result<(), StoreError>;

    /// Pause or resume a target
    async fn set_active(&self, id: &TargetId, active: bool) -> Result<(), StoreError>;

    /// Delete a target together with its measurements
    async fn delete_target(&self, id: &TargetId) -> Result<(), StoreError>;
}

/// LibSQL store implementation
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    /// Create a new store instance from a pool
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>, StoreError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl Store for LibsqlStore {
    async fn active_targets(&self) -> Result<Vec<TargetRef>, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query("SELECT id, url FROM monitors WHERE active = 1 ORDER BY created_at_ms", ())
            .await?;

        let mut targets = Vec::new();
        while let Some(row) = rows.next().await? {
            targets.push(TargetRef::new(row.get::<String>(0)?, row.get::<String>(1)?));
        }

        Ok(targets)
    }

    async fn targets_for_owner(&self, owner_id: &str) -> Result<Vec<Target>, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {TARGET_COLUMNS} FROM monitors \
                     WHERE owner_id = ? ORDER BY created_at_ms"
                ),
                params![owner_id.to_string()],
            )
            .await?;

        let mut targets = Vec::new();
        while let Some(row) = rows.next().await? {
            targets.push(target_from_row(&row)?);
        }

        Ok(targets)
    }

    async fn get_target(&self, id: &TargetId) -> Result<Option<Target>, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {TARGET_COLUMNS} FROM monitors WHERE id = ?"),
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(target_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn append_measurement(&self, measurement: &Measurement) -> Result<i64, StoreError> {
        let latency_ms = latency_to_sql(measurement.latency_ms)?;
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT INTO pings (monitor_id, status_code, latency_ms, created_at_ms) \
             VALUES (?, ?, ?, ?)",
            params![
                measurement.target_id.to_string(),
                measurement.status_code as i64,
                latency_ms,
                timestamp_to_millis(measurement.created_at)
            ],
        )
        .await?;

        Ok(conn.last_insert_rowid())
    }

    async fn update_target_state(
        &self,
        id: &TargetId,
        update: &StateUpdate,
    ) -> Result<(), StoreError> {
        let last_latency_ms = latency_to_sql(update.last_latency_ms)?;
        let conn = self.get_conn().await?;

        let changed = conn
            .execute(
                "UPDATE monitors SET status = ?, last_check_ms = ?, last_latency_ms = ? \
                 WHERE id = ?",
                params![
                    update.status.to_string(),
                    timestamp_to_millis(update.last_check),
                    last_latency_ms,
                    id.to_string()
                ],
            )
            .await?;

        if changed == 0 {
            return Err(StoreError::TargetNotFound(id.clone()));
        }

        Ok(())
    }

    async fn recent_measurements(
        &self,
        id: &TargetId,
        limit: usize,
    ) -> Result<Vec<Measurement>, StoreError> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {PING_COLUMNS} FROM pings WHERE monitor_id = ? \
                     ORDER BY created_at_ms DESC, id DESC LIMIT ?"
                ),
                params![id.to_string(), limit as i64],
            )
            .await?;

        let mut measurements = Vec::new();
        while let Some(row) = rows.next().await? {
            measurements.push(measurement_from_row(&row)?);
        }

        Ok(measurements)
    }

    async fn insert_target(&self, target: &Target) -> Result<(), StoreError> {
        let conn = self.get_conn().await?;

        conn.execute(
            &format!(
                "INSERT INTO monitors ({TARGET_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                target.id.to_string(),
                target.name.clone(),
                target.url.clone(),
                target.owner_id.clone(),
                if target.active { 1 } else { 0 },
                target.status.to_string(),
                target.last_check.map(timestamp_to_millis),
                target.last_latency_ms.map(latency_to_sql).transpose()?,
                timestamp_to_millis(target.created_at)
            ],
        )
        .await?;

        Ok(())
    }

    async fn set_active(&self, id: &TargetId, active: bool) -> Result<(), StoreError> {
        let conn = self.get_conn().await?;

        let changed = conn
            .execute(
                "UPDATE monitors SET active = ? WHERE id = ?",
                params![if active { 1 } else { 0 }, id.to_string()],
            )
            .await?;

        if changed == 0 {
            return Err(StoreError::TargetNotFound(id.clone()));
        }

        Ok(())
    }

    async fn delete_target(&self, id: &TargetId) -> Result<(), StoreError> {
        let conn = self.get_conn().await?;

        conn.execute("DELETE FROM pings WHERE monitor_id = ?", params![id.to_string()]).await?;
        conn.execute("DELETE FROM monitors WHERE id = ?", params![id.to_string()]).await?;

        Ok(())
    }
}
