//! Wholesale replacement of one clock's history.

use tracing::debug;

use super::transition::{process_event, replay, validate_id};
use crate::error::Result;
use crate::events::{sort_by_time, Clock, ClockEvent, ClockStore, TimedEvent};

/// Replace the history of clock `id` with `events`.
///
/// The events are sorted by time (ties keep their input order), the clock is
/// replaced by a fresh reset clock, and the events are replayed through the
/// ordinary transitions. The first rejected transition fails the whole rewrite.
///
/// The rewritten clock must also fit alongside every other clock: the merged
/// log of the resulting store has to replay from empty, so a rewrite whose
/// sessions overlap another clock's sessions is rejected.
pub fn clock_rewrite(mut store: ClockStore, id: &str, events: Vec<TimedEvent>) -> Result<ClockStore> {
    validate_id(id)?;

    let mut events: Vec<ClockEvent> = events.into_iter().map(|e| e.into_event(id)).collect();
    sort_by_time(&mut events);

    store.insert(Clock::new(id));
    let store = events.iter().try_fold(store, process_event)?;

    replay(&store.ordered_events())?;

    debug!(clock = id, events = events.len(), "history rewritten");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transition::{clock_in, clock_out};
    use crate::error::ErrorCode;
    use crate::events::{ClockStatus, EventKind, Timestamp};
    use chrono::DateTime;

    fn at(time: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(&format!("2024-03-01T{}Z", time)).unwrap()
    }

    fn timed(kind: EventKind, time: &str) -> TimedEvent {
        TimedEvent::new(kind, at(time))
    }

    #[test]
    fn test_rewrite_sorts_and_replays() {
        let store = clock_in(ClockStore::new(), "work", at("12:00:00")).unwrap();

        let store = clock_rewrite(
            store,
            "work",
            vec![
                timed(EventKind::Stop, "10:00:00"),
                timed(EventKind::Start, "09:00:00"),
            ],
        )
        .unwrap();

        let clock = store.get("work").unwrap();
        assert_eq!(clock.status, ClockStatus::ClockedOut);
        assert_eq!(clock.elapsed_seconds, 3600);
        assert_eq!(clock.events[0].kind(), EventKind::Start);
    }

    #[test]
    fn test_rewrite_rejects_double_start() {
        let err = clock_rewrite(
            ClockStore::new(),
            "work",
            vec![
                timed(EventKind::Start, "09:00:00"),
                timed(EventKind::Start, "10:00:00"),
            ],
        )
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn test_rewrite_to_empty_history() {
        let store = clock_in(ClockStore::new(), "work", at("09:00:00")).unwrap();
        let store = clock_out(store, "work", at("10:00:00")).unwrap();

        let store = clock_rewrite(store, "work", vec![]).unwrap();
        let clock = store.get("work").unwrap();
        assert_eq!(clock.status, ClockStatus::ClockReset);
        assert!(clock.events.is_empty());
    }

    #[test]
    fn test_rewrite_rejects_overlap_with_other_clock() {
        let store = clock_in(ClockStore::new(), "a", at("09:00:00")).unwrap();
        let store = clock_out(store, "a", at("11:00:00")).unwrap();

        let err = clock_rewrite(
            store,
            "b",
            vec![
                timed(EventKind::Start, "10:00:00"),
                timed(EventKind::Stop, "10:30:00"),
            ],
        )
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ClockAlreadyActive);
    }

    #[test]
    fn test_rewrite_leaves_other_clocks_alone() {
        let store = clock_in(ClockStore::new(), "a", at("09:00:00")).unwrap();
        let store = clock_out(store, "a", at("10:00:00")).unwrap();

        let store = clock_rewrite(
            store,
            "b",
            vec![
                timed(EventKind::Start, "10:00:00"),
                timed(EventKind::Stop, "10:30:00"),
            ],
        )
        .unwrap();

        assert_eq!(store.get("a").unwrap().elapsed_seconds, 3600);
        assert_eq!(store.get("b").unwrap().elapsed_seconds, 1800);
    }
}
