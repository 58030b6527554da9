//! Staleness clock
//!
//! Pure time-window comparisons. "Updated since N days" is true when the
//! elapsed time is at most N days; a negative N is never satisfied, which
//! is how a negative threshold disables an action.

use chrono::{DateTime, Utc};
use thiserror::Error;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Parse an RFC 3339 / ISO-8601 timestamp with offset
pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, ClockError> {
    DateTime::parse_from_rfc3339(timestamp.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ClockError::InvalidTimestamp(timestamp.to_string()))
}

/// Whether `timestamp` lies within the last `days` days
pub fn updated_since(timestamp: DateTime<Utc>, days: f64) -> bool {
    updated_since_at(Utc::now(), timestamp, days)
}

/// `updated_since` measured from an explicit `now`
pub fn updated_since_at(now: DateTime<Utc>, timestamp: DateTime<Utc>, days: f64) -> bool {
    if days.is_nan() || days < 0.0 {
        return false;
    }
    elapsed_millis(now, timestamp) <= days * MILLIS_PER_DAY
}

/// Whether `timestamp` is older than `days` days; close eligibility
pub fn was_last_updated_before(timestamp: DateTime<Utc>, days: f64) -> bool {
    !updated_since(timestamp, days)
}

/// Whether two instants are within `tolerance_seconds` of each other
pub fn are_dates_equal(date: DateTime<Utc>, other: DateTime<Utc>, tolerance_seconds: f64) -> bool {
    elapsed_millis(date, other).abs() / 1000.0 <= tolerance_seconds
}

/// Sub-millisecond precision so a same-instant "0 days" check stays meaningful
fn elapsed_millis(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> f64 {
    let elapsed = now.signed_duration_since(timestamp);
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 1000.0,
        None => elapsed.num_milliseconds() as f64,
    }
}
