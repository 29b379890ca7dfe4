use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike};

use crate::model::Ms;

/// Conversions between unix-millisecond timestamps and the display/input
/// string formats the HTTP surface speaks.
///
/// The display formats are wire contract, quirks included:
/// - times are unpadded `H:M:S`
/// - dates are `D/M/Y` with a ZERO-indexed month (January = 0)
///
/// Input dates use the ordinary one-based month. The asymmetry is inherited
/// from the system this replaces and is pinned down by tests.

#[derive(Debug)]
pub enum CodecError {
    BadDate(String),
    BadTime(String),
    /// Local time that does not exist (e.g. inside a DST gap).
    Unrepresentable(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::BadDate(s) => write!(f, "unparsable date: {s:?} (expected D/M/Y)"),
            CodecError::BadTime(s) => write!(f, "unparsable time: {s:?} (expected H:M or H:M:S)"),
            CodecError::Unrepresentable(s) => write!(f, "no such local time: {s}"),
        }
    }
}

impl std::error::Error for CodecError {}

fn local_datetime(ts: Ms) -> Option<DateTime<Local>> {
    match Local.timestamp_millis_opt(ts) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

/// `"H:M:S"` in local time, components unpadded (09:05:03 → `"9:5:3"`).
pub fn display_time(ts: Ms) -> String {
    match local_datetime(ts) {
        Some(dt) => format!("{}:{}:{}", dt.hour(), dt.minute(), dt.second()),
        None => "Invalid Date".to_string(),
    }
}

/// `"D/M/Y"` in local time with zero-indexed month (2024-01-15 → `"15/0/2024"`).
pub fn display_date(ts: Ms) -> String {
    match local_datetime(ts) {
        Some(dt) => format!("{}/{}/{}", dt.day(), dt.month0(), dt.year()),
        None => "Invalid Date".to_string(),
    }
}

/// Parse a `"D/M/Y"` date string (one-based month, no padding required).
pub fn parse_date(s: &str) -> Result<NaiveDate, CodecError> {
    NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y").map_err(|_| CodecError::BadDate(s.to_string()))
}

/// Parse a time-of-day string, `"H:M"` or `"H:M:S"`.
pub fn parse_time(s: &str) -> Result<NaiveTime, CodecError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| CodecError::BadTime(s.to_string()))
}

/// Resolve a local date + time-of-day to unix milliseconds.
/// A DST-ambiguous wall time resolves to the earliest instant.
pub fn local_ms(date: NaiveDate, time: NaiveTime) -> Result<Ms, CodecError> {
    let naive = date.and_time(time);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.timestamp_millis()),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.timestamp_millis()),
        LocalResult::None => Err(CodecError::Unrepresentable(naive.to_string())),
    }
}

/// Midnight of the given local date, in unix milliseconds.
pub fn local_midnight_ms(date: NaiveDate) -> Result<Ms, CodecError> {
    local_ms(date, NaiveTime::MIN)
}
