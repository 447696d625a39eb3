//! Newline-delimited JSON event input.
//!
//! One JSON object per line: an opaque id, four bounding-box floats, an
//! optional location name, and a UTC timestamp in strict ISO-8601 with a
//! trailing `Z`. Malformed lines are per-line failures — logged, counted,
//! and skipped — never batch failures.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use legaltime_types::{EventId, EventRecord, QueryBox};
use serde::Deserialize;
use tracing::warn;

use crate::error::RunnerError;

/// On-disk shape of one event line.
#[derive(Debug, Deserialize)]
struct EventLine {
    id: String,
    #[serde(default)]
    name: Option<String>,
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
    timestamp: String,
}

/// Parsed input: usable events plus the count of skipped lines.
#[derive(Debug)]
pub struct InputBatch {
    /// Events in file order.
    pub events: Vec<EventRecord>,
    /// Lines that failed to parse.
    pub skipped: usize,
}

/// Read every event line from an NDJSON file.
///
/// # Errors
///
/// Returns [`RunnerError::Io`] only for file-level failures; malformed
/// lines are skipped with a warning.
pub fn read_events(path: &Path) -> Result<InputBatch, RunnerError> {
    let file = File::open(path)?;
    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_event_line(&line) {
            Ok(event) => events.push(event),
            Err(reason) => {
                warn!(
                    line = index.saturating_add(1),
                    reason = %reason,
                    "skipping malformed event line"
                );
                skipped = skipped.saturating_add(1);
            }
        }
    }

    Ok(InputBatch { events, skipped })
}

/// Parse one NDJSON line into an event record.
fn parse_event_line(line: &str) -> Result<EventRecord, String> {
    let parsed: EventLine = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let timestamp = parse_event_timestamp(&parsed.timestamp)?;
    Ok(EventRecord {
        id: EventId::new(parsed.id),
        name: parsed.name,
        query: QueryBox::new(
            parsed.min_lon,
            parsed.min_lat,
            parsed.max_lon,
            parsed.max_lat,
        ),
        timestamp,
    })
}

/// Parse a strict ISO-8601-with-`Z` timestamp. Event timestamps are always
/// UTC; anything else is rejected.
pub fn parse_event_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let naive = raw
        .strip_suffix('Z')
        .ok_or_else(|| format!("timestamp {raw:?} does not end in Z"))?;
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|n| n.and_utc())
        .map_err(|e| format!("timestamp {raw:?} is not ISO-8601: {e}"))
}
