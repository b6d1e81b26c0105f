use chrono::{DateTime, Utc};
use libsql::Row;

use crate::error::StoreError;
use crate::monitoring::{Measurement, Target, TargetId};

/// Column list matching [`target_from_row`]
pub(crate) const TARGET_COLUMNS: &str =
    "id, name, url, owner_id, active, status, last_check_ms, last_latency_ms, created_at_ms";

/// Column list matching [`measurement_from_row`]
pub(crate) const PING_COLUMNS: &str = "id, monitor_id, status_code, latency_ms, created_at_ms";

/// Convert a timestamp to Unix milliseconds
pub fn timestamp_to_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Convert Unix milliseconds back to a timestamp
pub fn millis_to_timestamp(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {millis}")))
}

/// Latency as written to an INTEGER column
pub fn latency_to_sql(latency_ms: u64) -> Result<i64, StoreError> {
    i64::try_from(latency_ms)
        .map_err(|_| StoreError::OutOfRange(format!("latency {latency_ms} ms")))
}

fn latency_from_sql(raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::Corrupt(format!("negative latency: {raw}")))
}

pub(crate) fn target_from_row(row: &Row) -> Result<Target, StoreError> {
    let status: String = row.get(5)?;

    Ok(Target {
        id: TargetId::new(row.get::<String>(0)?),
        name: row.get(1)?,
        url: row.get(2)?,
        owner_id: row.get(3)?,
        active: row.get::<i64>(4)? != 0,
        status: status.parse().map_err(StoreError::Corrupt)?,
        last_check: row.get::<Option<i64>>(6)?.map(millis_to_timestamp).transpose()?,
        last_latency_ms: row.get::<Option<i64>>(7)?.map(latency_from_sql).transpose()?,
        created_at: millis_to_timestamp(row.get(8)?)?,
    })
}

pub(crate) fn measurement_from_row(row: &Row) -> Result<Measurement, StoreError> {
    let status_code: i64 = row.get(2)?;

    Ok(Measurement {
        id: Some(row.get(0)?),
        target_id: TargetId::new(row.get::<String>(1)?),
        status_code: u16::try_from(status_code)
            .map_err(|_| StoreError::Corrupt(format!("status code out of range: {status_code}")))?,
        latency_ms: latency_from_sql(row.get(3)?)?,
        created_at: millis_to_timestamp(row.get(4)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_round_trip() {
        let now = Utc::now();
        let restored = millis_to_timestamp(timestamp_to_millis(now)).unwrap();
        assert_eq!(restored.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_out_of_range_millis_is_corrupt() {
        assert!(matches!(millis_to_timestamp(i64::MAX), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_latency_conversions_never_wrap() {
        assert_eq!(latency_to_sql(48).unwrap(), 48);
        assert_eq!(latency_to_sql(i64::MAX as u64).unwrap(), i64::MAX);
        assert!(matches!(latency_to_sql(u64::MAX), Err(StoreError::OutOfRange(_))));
        assert!(matches!(latency_from_sql(-1), Err(StoreError::Corrupt(_))));
    }
}
