//! History retention.
//!
//! Truncation cuts each clock's history back to a session boundary, never
//! through the middle of a session, so the retained events always begin with
//! a start and replay on their own.

use tracing::debug;

use crate::events::{time_ordered, ClockEvent, ClockStore, Timestamp};

/// Drop history older than `cutoff`, clock by clock.
///
/// For each clock, the first session (since its last reset) that ends on or
/// after `cutoff` is kept whole, along with everything after it; events before
/// that session's start are dropped. A clock with no such session keeps its
/// history untouched. Status and elapsed seconds are never changed.
pub fn truncate_clockstore(mut store: ClockStore, cutoff: Timestamp, now: Timestamp) -> ClockStore {
    for clock in store.clocks_mut() {
        let ordered = time_ordered(&clock.events);

        if let Some(index) = boundary_index(&ordered, cutoff, now) {
            if index > 0 {
                let retained: Vec<ClockEvent> = ordered[index..].iter().map(|e| (*e).clone()).collect();
                debug!(clock = %clock.id, dropped = index, retained = retained.len(), "history truncated");
                clock.events = retained;
            }
        }
    }
    store
}

/// Position of the start event of the first session ending on or after `cutoff`.
///
/// Cutting by position rather than by timestamp keeps a stop or reset that
/// shares its instant with the boundary start out of the retained history.
fn boundary_index(ordered: &[&ClockEvent], cutoff: Timestamp, now: Timestamp) -> Option<usize> {
    let mut first: Option<usize> = None;
    let mut open: Option<usize> = None;

    for (index, event) in ordered.iter().enumerate() {
        match event {
            ClockEvent::StartClock { .. } => open = Some(index),
            ClockEvent::StopClock { timestamp, .. } => {
                if let Some(start) = open.take() {
                    if first.is_none() && *timestamp >= cutoff {
                        first = Some(start);
                    }
                }
            }
            ClockEvent::ResetClock { .. } => {
                first = None;
                open = None;
            }
        }
    }

    match (first, open) {
        (Some(start), _) => Some(start),
        (None, Some(start)) if now >= cutoff => Some(start),
        _ => None,
    }
}
