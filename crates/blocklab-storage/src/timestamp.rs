//! Store clock.
//!
//! Timestamps are persisted as integer microseconds, so every stamp handed
//! out here is truncated to microsecond precision. Update stamps are strictly
//! later than the stamp they replace even when the wall clock has not moved.

use chrono::{DateTime, Duration, Utc};

/// Current time truncated to microseconds.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

/// A stamp strictly after `previous`.
pub fn after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

pub fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

pub fn from_micros(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}
