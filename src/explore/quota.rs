//! Daily quota tracking
//!
//! The quota is derived state: the count of catalog records for a platform
//! whose `last_indexed_at` falls on the current calendar day of the run
//! clock. No separate counter entity is persisted, so the quota resets
//! itself at the day boundary and heals after partial runs.

use crate::storage::{StorageResult, Store};
use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

/// Computes the UTC bounds `[start, end)` of the local calendar day
/// containing `now`
pub fn local_day_bounds(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = now.date_naive();
    let midnight = day.and_time(NaiveTime::MIN);

    // For the rare DST gap at midnight, fall back to the UTC reading
    let start = Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight));

    (start, start + Duration::days(1))
}

/// Checks whether the platform has hit its daily item quota
///
/// A limit of `None` (absent or configured as zero) means unlimited and the
/// predicate is false. Records indexed on prior days never count toward
/// today's quota.
///
/// # Arguments
///
/// * `store` - The record store to count against
/// * `platform` - The platform identifier
/// * `daily_limit` - The configured ceiling, if any
/// * `now` - The run clock
pub fn daily_limit_reached(
    store: &dyn Store,
    platform: &str,
    daily_limit: Option<u64>,
    now: DateTime<Local>,
) -> StorageResult<bool> {
    let Some(limit) = daily_limit else {
        return Ok(false);
    };

    let (start, end) = local_day_bounds(now);
    let indexed_today = store.count_indexed_between(platform, start, end)?;

    Ok(indexed_today >= limit)
}
