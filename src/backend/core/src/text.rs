//! Semicolon-delimited text interchange.
//!
//! History lines look like
//!
//! ```text
//! 2024-03-01T09:00:00+01:00; stop; 1:30:00
//! ```
//!
//! and rewrite input takes `<timestamp>; <event>` with any further fields
//! ignored, so history output can be fed straight back into a rewrite.

use chrono::DateTime;

use crate::engine::HistoryEntry;
use crate::error::{PunchError, Result};
use crate::events::{EventKind, TimedEvent, Timestamp};

const SEPARATOR: char = ';';

/// Render seconds as `H:MM:SS` with unpadded hours.
pub fn format_hms(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let total = seconds.unsigned_abs();
    format!("{}{}:{:02}:{:02}", sign, total / 3600, (total / 60) % 60, total % 60)
}

pub fn format_history_line(entry: &HistoryEntry) -> String {
    format!(
        "{}{} {}{} {}",
        entry.timestamp.to_rfc3339(),
        SEPARATOR,
        entry.event,
        SEPARATOR,
        format_hms(entry.cumulative_seconds)
    )
}

/// One line per entry, each terminated by a newline.
pub fn format_history(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .map(|entry| format_history_line(entry) + "\n")
        .collect()
}

fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|e| PunchError::invalid_format(format!("Invalid timestamp '{}': {}", raw, e)))
}

/// Parse one `<timestamp>; <event>[; ...]` line.
pub fn parse_rewrite_line(line: &str) -> Result<TimedEvent> {
    let mut fields = line.split(SEPARATOR).map(str::trim);

    let (timestamp, event) = match (fields.next(), fields.next()) {
        (Some(timestamp), Some(event)) if !timestamp.is_empty() => (timestamp, event),
        _ => {
            return Err(PunchError::invalid_format(format!(
                "Expected '<timestamp>; <event>', got '{}'",
                line.trim()
            )))
        }
    };

    Ok(TimedEvent::new(event.parse::<EventKind>()?, parse_timestamp(timestamp)?))
}

/// Parse a whole rewrite document, skipping blank lines.
///
/// Errors name the offending line (1-based).
pub fn parse_rewrite_input(input: &str) -> Result<Vec<TimedEvent>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_rewrite_line(line).map_err(|e| {
                let line_no = index + 1;
                PunchError::new(e.code(), format!("line {}: {}", line_no, e.message()))
                    .with_context("line", line_no)
            })
        })
        .collect()
}
