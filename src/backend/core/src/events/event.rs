//! Domain events for the clock log.
//!
//! This module provides:
//! - `ClockEvent`, the immutable start/stop/reset facts the store is built from
//! - `EventKind`, the wire-level name of each event (`start`, `stop`, `reset`)
//! - `TimedEvent`, a kind plus timestamp without a clock id (rewrite input)
//! - Stable time ordering helpers

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PunchError;

/// Timestamps keep the offset they were recorded with.
pub type Timestamp = DateTime<FixedOffset>;

// =============================================================================
// Event Kind
// =============================================================================

/// The three kinds of clock events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Start,
    Stop,
    Reset,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = PunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "reset" => Ok(Self::Reset),
            other => Err(PunchError::invalid_event_kind(other)),
        }
    }
}

// =============================================================================
// Clock Event
// =============================================================================

/// An immutable fact in the clock log.
///
/// Serialized as `{"event": "start", "timestamp": "...", "id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ClockEvent {
    #[serde(rename = "start")]
    StartClock { timestamp: Timestamp, id: String },

    #[serde(rename = "stop")]
    StopClock { timestamp: Timestamp, id: String },

    #[serde(rename = "reset")]
    ResetClock { timestamp: Timestamp, id: String },
}

impl ClockEvent {
    /// Build an event of the given kind.
    pub fn new(kind: EventKind, timestamp: Timestamp, id: impl Into<String>) -> Self {
        let id = id.into();
        match kind {
            EventKind::Start => Self::StartClock { timestamp, id },
            EventKind::Stop => Self::StopClock { timestamp, id },
            EventKind::Reset => Self::ResetClock { timestamp, id },
        }
    }

    pub fn start(timestamp: Timestamp, id: impl Into<String>) -> Self {
        Self::new(EventKind::Start, timestamp, id)
    }

    pub fn stop(timestamp: Timestamp, id: impl Into<String>) -> Self {
        Self::new(EventKind::Stop, timestamp, id)
    }

    pub fn reset(timestamp: Timestamp, id: impl Into<String>) -> Self {
        Self::new(EventKind::Reset, timestamp, id)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::StartClock { .. } => EventKind::Start,
            Self::StopClock { .. } => EventKind::Stop,
            Self::ResetClock { .. } => EventKind::Reset,
        }
    }

    pub fn timestamp(&self) -> &Timestamp {
        match self {
            Self::StartClock { timestamp, .. }
            | Self::StopClock { timestamp, .. }
            | Self::ResetClock { timestamp, .. } => timestamp,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::StartClock { id, .. } | Self::StopClock { id, .. } | Self::ResetClock { id, .. } => id,
        }
    }

    /// Drop the clock id, keeping kind and time.
    pub fn to_timed(&self) -> TimedEvent {
        TimedEvent {
            event: self.kind(),
            timestamp: *self.timestamp(),
        }
    }
}

/// An event kind and timestamp, without the clock it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub event: EventKind,
    pub timestamp: Timestamp,
}

impl TimedEvent {
    pub fn new(event: EventKind, timestamp: Timestamp) -> Self {
        Self { event, timestamp }
    }

    /// Attach a clock id.
    pub fn into_event(self, id: impl Into<String>) -> ClockEvent {
        ClockEvent::new(self.event, self.timestamp, id)
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Sort events by instant. The sort is stable, so ties keep their input order.
pub fn sort_by_time(events: &mut [ClockEvent]) {
    events.sort_by(|a, b| a.timestamp().cmp(b.timestamp()));
}

/// Borrowing variant of [`sort_by_time`].
pub fn time_ordered(events: &[ClockEvent]) -> Vec<&ClockEvent> {
    let mut ordered: Vec<&ClockEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.timestamp().cmp(b.timestamp()));
    ordered
}
