//! FILETIME decoding.
//!
//! Windows reports instants as a 64-bit count of 100-nanosecond intervals
//! since 1601-01-01 UTC, usually split into low and high DWORDs.

use chrono::{DateTime, Utc};

/// 100-nanosecond intervals between 1601-01-01 and 1970-01-01.
pub const INTERVALS_BETWEEN_1601_AND_1970: i64 = 116_444_736_000_000_000;

const INTERVALS_PER_SECOND: i128 = 10_000_000;
const NANOS_PER_INTERVAL: i128 = 100;

/// Join the low and high DWORDs of a FILETIME into one tick count.
pub const fn ticks(low: u32, high: u32) -> u64 {
    ((high as u64) << 32) | low as u64
}

/// Convert the low and high halves of a FILETIME into a UTC instant.
///
/// Every `u64` tick count lands between 1601 and roughly the year 60056, well
/// inside chrono's range, so the `MAX_UTC` fallback is never taken in
/// practice.
pub fn to_datetime(low: u32, high: u32) -> DateTime<Utc> {
    let offset = i128::from(ticks(low, high)) - i128::from(INTERVALS_BETWEEN_1601_AND_1970);
    let secs = offset.div_euclid(INTERVALS_PER_SECOND);
    let nanos = offset.rem_euclid(INTERVALS_PER_SECOND) * NANOS_PER_INTERVAL;

    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, nanos as u32))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Encode a UTC instant back into FILETIME `(low, high)` halves.
///
/// Instants before 1601 clamp to zero and sub-interval precision is dropped.
pub fn to_filetime(instant: DateTime<Utc>) -> (u32, u32) {
    let intervals = i128::from(instant.timestamp()) * INTERVALS_PER_SECOND
        + i128::from(instant.timestamp_subsec_nanos()) / NANOS_PER_INTERVAL
        + i128::from(INTERVALS_BETWEEN_1601_AND_1970);
    let ticks = u64::try_from(intervals.max(0)).unwrap_or(u64::MAX);
    (ticks as u32, (ticks >> 32) as u32)
}
