//! State transitions.
//!
//! Each transition takes the current store by value and returns the next one,
//! or the reason the transition is not allowed. A rejected transition consumes
//! the store it was given; callers that must keep the old snapshot pass a clone.

use tracing::trace;

use crate::error::{PunchError, Result};
use crate::events::{ClockEvent, ClockStatus, ClockStore, Timestamp};

/// Reject empty clock ids.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(PunchError::invalid_identifier());
    }
    Ok(())
}

/// Start a clock.
///
/// Fails if the clock is already running, or if any other clock is running.
pub fn clock_in(mut store: ClockStore, id: &str, now: Timestamp) -> Result<ClockStore> {
    validate_id(id)?;

    if store.status_of(id) == ClockStatus::ClockedIn {
        return Err(PunchError::already_clocked_in(id));
    }
    if let Some(active) = store.currently_clocked_in() {
        return Err(PunchError::clock_already_active(id, &active.id));
    }

    let clock = store.get_or_create(id);
    clock.events.push(ClockEvent::start(now, id));
    clock.status = ClockStatus::ClockedIn;

    trace!(clock = id, at = %now, "clocked in");
    Ok(store)
}

/// Stop a running clock, adding the closed session to its elapsed seconds.
pub fn clock_out(mut store: ClockStore, id: &str, now: Timestamp) -> Result<ClockStore> {
    validate_id(id)?;

    let status = store.status_of(id);
    let clock = match store.get_mut(id) {
        Some(clock) if status == ClockStatus::ClockedIn => clock,
        _ => return Err(PunchError::not_clocked_in(id, status)),
    };

    let started = clock
        .last_clocked_in()
        .ok_or_else(|| PunchError::missing_clock_in(id))?;

    let session = (now - started).num_seconds();
    clock.elapsed_seconds += session;
    clock.events.push(ClockEvent::stop(now, id));
    clock.status = ClockStatus::ClockedOut;

    trace!(clock = id, at = %now, session_seconds = session, "clocked out");
    Ok(store)
}

/// Reset a stopped clock.
///
/// Returns the elapsed seconds the clock held just before the reset.
pub fn clock_reset(mut store: ClockStore, id: &str, now: Timestamp) -> Result<(ClockStore, i64)> {
    validate_id(id)?;

    let status = store.status_of(id);
    let clock = match store.get_mut(id) {
        Some(clock) if status == ClockStatus::ClockedOut => clock,
        _ => return Err(PunchError::not_clocked_out(id, status)),
    };

    let previous = clock.elapsed_seconds;
    clock.elapsed_seconds = 0;
    clock.events.push(ClockEvent::reset(now, id));
    clock.status = ClockStatus::ClockReset;

    trace!(clock = id, at = %now, previous_seconds = previous, "clock reset");
    Ok((store, previous))
}

/// Apply one event through the matching transition.
pub fn process_event(store: ClockStore, event: &ClockEvent) -> Result<ClockStore> {
    match event {
        ClockEvent::StartClock { timestamp, id } => clock_in(store, id, *timestamp),
        ClockEvent::StopClock { timestamp, id } => clock_out(store, id, *timestamp),
        ClockEvent::ResetClock { timestamp, id } => {
            clock_reset(store, id, *timestamp).map(|(store, _)| store)
        }
    }
}

/// Build a store by replaying events, in the given order, from empty.
pub fn replay<'a, I>(events: I) -> Result<ClockStore>
where
    I: IntoIterator<Item = &'a ClockEvent>,
{
    events.into_iter().try_fold(ClockStore::new(), process_event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::DateTime;

    fn at(time: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(&format!("2024-03-01T{}+01:00", time)).unwrap()
    }

    #[test]
    fn test_clock_in_creates_clock() {
        let store = clock_in(ClockStore::new(), "work", at("09:00:00")).unwrap();
        let clock = store.get("work").unwrap();

        assert_eq!(clock.status, ClockStatus::ClockedIn);
        assert_eq!(clock.elapsed_seconds, 0);
        assert_eq!(clock.events, vec![ClockEvent::start(at("09:00:00"), "work")]);
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let err = clock_in(ClockStore::new(), "", at("09:00:00")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidIdentifier);
    }

    #[test]
    fn test_double_clock_in_fails() {
        let store = clock_in(ClockStore::new(), "work", at("09:00:00")).unwrap();
        let err = clock_in(store, "work", at("09:30:00")).unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert!(err.message().contains("must be stopped before it can be started"));
    }

    #[test]
    fn test_clock_in_while_other_active_fails() {
        let store = clock_in(ClockStore::new(), "a", at("09:00:00")).unwrap();
        let err = clock_in(store.clone(), "b", at("09:30:00")).unwrap_err();

        assert_eq!(err.code(), ErrorCode::ClockAlreadyActive);
        assert_eq!(store.currently_clocked_in().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn test_clock_out_accumulates_truncated_seconds() {
        let store = clock_in(ClockStore::new(), "work", at("09:00:00")).unwrap();
        let later = DateTime::parse_from_rfc3339("2024-03-01T09:10:05.900+01:00").unwrap();
        let store = clock_out(store, "work", later).unwrap();

        let clock = store.get("work").unwrap();
        assert_eq!(clock.status, ClockStatus::ClockedOut);
        assert_eq!(clock.elapsed_seconds, 605);
    }

    #[test]
    fn test_clock_out_requires_clocked_in() {
        let err = clock_out(ClockStore::new(), "work", at("09:00:00")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);

        let store = clock_in(ClockStore::new(), "work", at("09:00:00")).unwrap();
        let store = clock_out(store, "work", at("10:00:00")).unwrap();
        let err = clock_out(store, "work", at("11:00:00")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn test_clock_out_without_start_event_is_missing_clock_in() {
        let mut store = ClockStore::new();
        store.get_or_create("work").status = ClockStatus::ClockedIn;

        let err = clock_out(store, "work", at("10:00:00")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingClockIn);
    }

    #[test]
    fn test_clock_reset_returns_previous_elapsed() {
        let store = clock_in(ClockStore::new(), "work", at("09:00:00")).unwrap();
        let store = clock_out(store, "work", at("10:30:00")).unwrap();
        let (store, previous) = clock_reset(store, "work", at("11:00:00")).unwrap();

        assert_eq!(previous, 5400);
        let clock = store.get("work").unwrap();
        assert_eq!(clock.status, ClockStatus::ClockReset);
        assert_eq!(clock.elapsed_seconds, 0);
        assert_eq!(clock.events.len(), 3);
    }

    #[test]
    fn test_clock_reset_requires_clocked_out() {
        let err = clock_reset(ClockStore::new(), "work", at("09:00:00")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        assert!(err.message().contains("must be stopped before it can be reset"));

        let store = clock_in(ClockStore::new(), "work", at("09:00:00")).unwrap();
        let err = clock_reset(store, "work", at("10:00:00")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn test_replay_matches_live_transitions() {
        let events = vec![
            ClockEvent::start(at("09:00:00"), "a"),
            ClockEvent::stop(at("10:00:00"), "a"),
            ClockEvent::start(at("10:00:00"), "b"),
            ClockEvent::stop(at("10:15:00"), "b"),
            ClockEvent::reset(at("11:00:00"), "a"),
        ];

        let store = replay(&events).unwrap();
        assert_eq!(store.get("a").unwrap().status, ClockStatus::ClockReset);
        assert_eq!(store.get("b").unwrap().elapsed_seconds, 900);
        assert_eq!(store.event_count(), 5);
    }
}
