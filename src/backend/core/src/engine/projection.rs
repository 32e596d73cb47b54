//! Read-only views of the store handed to callers.

use serde::{Deserialize, Serialize};

use super::transition::validate_id;
use crate::error::{PunchError, Result};
use crate::events::{cumulative_times, Clock, ClockStatus, ClockStore, EventKind, TimedEvent, Timestamp};

/// One row of `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSummary {
    pub id: String,
    pub status: ClockStatus,
    /// Includes the open session, measured up to the time of the read.
    pub elapsed_seconds: i64,
}

/// One row of `history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub event: EventKind,
    pub timestamp: Timestamp,
    pub cumulative_seconds: i64,
}

impl From<&HistoryEntry> for TimedEvent {
    fn from(entry: &HistoryEntry) -> Self {
        TimedEvent::new(entry.event, entry.timestamp)
    }
}

/// Elapsed seconds including the open session, if the clock is running.
pub fn live_elapsed(clock: &Clock, now: Timestamp) -> Result<i64> {
    match clock.status {
        ClockStatus::ClockedIn => {
            let started = clock
                .last_clocked_in()
                .ok_or_else(|| PunchError::missing_clock_in(&clock.id))?;
            Ok(clock.elapsed_seconds + (now - started).num_seconds())
        }
        ClockStatus::ClockedOut | ClockStatus::ClockReset => Ok(clock.elapsed_seconds),
    }
}

/// Every clock in id order.
pub fn list(store: &ClockStore, now: Timestamp) -> Result<Vec<ClockSummary>> {
    store
        .clocks()
        .map(|clock| {
            Ok(ClockSummary {
                id: clock.id.clone(),
                status: clock.status,
                elapsed_seconds: live_elapsed(clock, now)?,
            })
        })
        .collect()
}

/// Id of the running clock, if any.
pub fn current(store: &ClockStore) -> Option<String> {
    store.currently_clocked_in().map(|c| c.id.clone())
}

/// Time-ordered history of one clock, annotated with running totals.
pub fn history(store: &ClockStore, id: &str) -> Result<Vec<HistoryEntry>> {
    validate_id(id)?;
    let clock = store.get(id).ok_or_else(|| PunchError::clock_not_found(id))?;

    Ok(cumulative_times(&clock.events)
        .into_iter()
        .map(|(event, cumulative_seconds)| HistoryEntry {
            event: event.kind(),
            timestamp: *event.timestamp(),
            cumulative_seconds,
        })
        .collect())
}
