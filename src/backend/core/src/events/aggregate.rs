//! The per-clock aggregate and its read-only derived figures.
//!
//! A `Clock` is the state folded from one clock's events: its status, the
//! seconds closed out by stops since the last reset, and the events themselves.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::event::{time_ordered, ClockEvent, Timestamp};

// =============================================================================
// Status
// =============================================================================

/// Status of a single clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockStatus {
    #[serde(rename = "in")]
    ClockedIn,
    #[serde(rename = "out")]
    ClockedOut,
    /// Initial state, and the state after a reset.
    #[default]
    #[serde(rename = "reset")]
    ClockReset,
}

impl ClockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClockedIn => "in",
            Self::ClockedOut => "out",
            Self::ClockReset => "reset",
        }
    }
}

impl std::fmt::Display for ClockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Clock Aggregate
// =============================================================================

/// Reconstructed state of one clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub id: String,
    pub status: ClockStatus,
    /// Seconds of closed sessions since the last reset. The open session is not included.
    pub elapsed_seconds: i64,
    pub events: Vec<ClockEvent>,
}

impl Clock {
    /// A fresh clock: reset, zero elapsed, no history.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: ClockStatus::ClockReset,
            elapsed_seconds: 0,
            events: Vec::new(),
        }
    }

    /// Timestamp of the most recent start event.
    pub fn last_clocked_in(&self) -> Option<Timestamp> {
        self.events
            .iter()
            .filter(|e| matches!(e, ClockEvent::StartClock { .. }))
            .map(|e| *e.timestamp())
            .max()
    }

    /// Start/end pairs of the sessions since the last reset, oldest first.
    ///
    /// A session still open at the end of the history ends at `now`, so retention
    /// never treats a running session as already finished.
    pub fn clock_bounding_times(&self, now: DateTime<FixedOffset>) -> Vec<(Timestamp, Timestamp)> {
        let mut sessions = Vec::new();
        let mut open: Option<Timestamp> = None;

        for event in time_ordered(&self.events) {
            match event {
                ClockEvent::StartClock { timestamp, .. } => open = Some(*timestamp),
                ClockEvent::StopClock { timestamp, .. } => {
                    if let Some(start) = open.take() {
                        sessions.push((start, *timestamp));
                    }
                }
                ClockEvent::ResetClock { .. } => {
                    sessions.clear();
                    open = None;
                }
            }
        }

        if let Some(start) = open {
            sessions.push((start, now));
        }
        sessions
    }
}

// =============================================================================
// Cumulative Times
// =============================================================================

/// Running total of closed-session seconds at each event, in time order.
///
/// A start reports the total so far, a stop includes the session it closes, and
/// a reset reports the total it discards. Totals restart from zero after a reset.
pub fn cumulative_times(events: &[ClockEvent]) -> Vec<(&ClockEvent, i64)> {
    let mut total = 0i64;
    let mut open: Option<Timestamp> = None;

    time_ordered(events)
        .into_iter()
        .map(|event| {
            let at_event = match event {
                ClockEvent::StartClock { timestamp, .. } => {
                    open = Some(*timestamp);
                    total
                }
                ClockEvent::StopClock { timestamp, .. } => {
                    if let Some(start) = open.take() {
                        total += (*timestamp - start).num_seconds();
                    }
                    total
                }
                ClockEvent::ResetClock { .. } => {
                    let before = total;
                    total = 0;
                    open = None;
                    before
                }
            };
            (event, at_event)
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
