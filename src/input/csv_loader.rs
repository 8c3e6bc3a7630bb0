//! CSV authentication log loader
//!
//! Reads `timestamp, user_id, ip_address, action` rows (extra columns are
//! ignored) and returns the events sorted by time.

use crate::models::AuthEvent;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that abort a load. There are no partial results.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid timestamp {value:?} on line {line}")]
    InvalidTimestamp { line: u64, value: String },
}

/// Columns the detectors need; serde skips everything else
#[derive(Debug, Deserialize)]
struct LogRecord {
    timestamp: String,
    user_id: String,
    ip_address: String,
    action: String,
}

/// Offset forms RFC 3339 parsing misses, such as `+0200` or a space separator
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y%m%dT%H%M%S%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

/// Hour-only forms; chrono needs a minute field, so `:00` is appended first
const HOUR_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parse an ISO-8601 timestamp. Values carrying an offset are normalized to
/// UTC; bare dates map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.naive_utc());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    let with_minutes = format!("{}:00", value);
    for format in HOUR_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&with_minutes, format) {
            return Some(dt);
        }
    }
    ["%Y-%m-%d", "%Y%m%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Read events from any CSV source with a header row
pub fn read_events<R: Read>(source: R) -> Result<Vec<AuthEvent>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let mut events = Vec::new();
    for result in reader.records() {
        let row = result?;
        let record: LogRecord = row.deserialize(Some(&headers))?;
        let timestamp = match parse_timestamp(&record.timestamp) {
            Some(ts) => ts,
            None => {
                return Err(LoadError::InvalidTimestamp {
                    line: row.position().map_or(0, |p| p.line()),
                    value: record.timestamp,
                });
            }
        };
        events.push(AuthEvent::new(
            timestamp,
            record.user_id,
            record.ip_address,
            record.action,
        ));
    }

    // stable: equal timestamps keep file order
    events.sort_by_key(|e| e.timestamp);
    Ok(events)
}

/// Load and sort all events from a CSV file
pub fn load_events<P: AsRef<Path>>(path: P) -> Result<Vec<AuthEvent>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let events = read_events(file)?;
    log::info!("Loaded {} event(s) from {}", events.len(), path.display());
    Ok(events)
}
