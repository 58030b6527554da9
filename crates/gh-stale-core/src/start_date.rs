//! Start date floor parsing
//!
//! Items created before the start date are never processed. The option
//! accepts epochs (seconds or milliseconds), ISO-8601 and a handful of
//! human-readable formats.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Integers below this are epoch seconds, anything else epoch milliseconds.
/// 1e11 seconds is the year 5138; 1e11 milliseconds is March 1973.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartDateError {
    #[error("Unparseable start date: {0:?}")]
    Unparseable(String),
}

/// Parse the start date option; empty means "no floor"
pub fn parse_start_date(raw: &str) -> Result<Option<DateTime<Utc>>, StartDateError> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(None);
    }

    parse_epoch(value)
        .or_else(|| parse_rfc(value))
        .or_else(|| parse_naive(value))
        .or_else(|| parse_js_date_string(value))
        .map(Some)
        .ok_or_else(|| StartDateError::Unparseable(raw.to_string()))
}

fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    let number: i64 = value.parse().ok()?;
    if number.abs() < EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp(number, 0)
    } else {
        DateTime::from_timestamp_millis(number)
    }
}

fn parse_rfc(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Dates without an offset are taken as UTC
fn parse_naive(value: &str) -> Option<DateTime<Utc>> {
    let date_time = DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok());
    if let Some(date_time) = date_time {
        return Some(date_time.and_utc());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date_time| date_time.and_utc())
}

/// `Wed Jan 01 2020 17:00:00 GMT+0000 (Coordinated Universal Time)`
fn parse_js_date_string(value: &str) -> Option<DateTime<Utc>> {
    let without_zone_name = match value.find(" (") {
        Some(index) => value.get(..index)?,
        None => value,
    };
    DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
