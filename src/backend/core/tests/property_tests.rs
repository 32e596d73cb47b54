//! Property tests over random operation sequences.
//!
//! Every generated sequence is applied live, the way the service would apply
//! it: rejected operations leave the store as it was.

use chrono::{DateTime, Duration};
use proptest::prelude::*;

use punchclock_core::engine::{clock_in, clock_out, clock_reset, clock_rewrite, history, list};
use punchclock_core::events::{ClockStatus, ClockStore, TimedEvent, Timestamp};
use punchclock_core::persistence::{from_json, to_json};

const IDS: &[&str] = &["alpha", "beta", "gamma"];

#[derive(Debug, Clone, Copy)]
enum Op {
    Start,
    Stop,
    Reset,
}

fn op_strategy() -> impl Strategy<Value = (Op, usize, i64)> {
    (
        prop_oneof![Just(Op::Start), Just(Op::Stop), Just(Op::Reset)],
        0..IDS.len(),
        // Zero gaps exercise events of different clocks at the same instant.
        prop_oneof![Just(0i64), 1i64..7200],
    )
}

fn epoch() -> Timestamp {
    DateTime::parse_from_rfc3339("2024-03-01T08:00:00+01:00").unwrap()
}

/// Apply ops live, checking the single-active invariant after each one.
fn run(ops: &[(Op, usize, i64)]) -> Result<ClockStore, TestCaseError> {
    let mut store = ClockStore::new();
    let mut now = epoch();

    for &(op, idx, gap) in ops {
        now += Duration::seconds(gap);
        let id = IDS[idx];
        let attempt = match op {
            Op::Start => clock_in(store.clone(), id, now),
            Op::Stop => clock_out(store.clone(), id, now),
            Op::Reset => clock_reset(store.clone(), id, now).map(|(s, _)| s),
        };
        if let Ok(next) = attempt {
            store = next;
        }

        let running = store.clocks().filter(|c| c.status == ClockStatus::ClockedIn).count();
        prop_assert!(running <= 1, "{} clocks running", running);
    }
    Ok(store)
}

proptest! {
    #[test]
    fn prop_at_most_one_clock_running(ops in prop::collection::vec(op_strategy(), 0..60)) {
        run(&ops)?;
    }

    #[test]
    fn prop_persistence_round_trip(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let store = run(&ops)?;
        let restored = from_json(&to_json(&store).unwrap()).unwrap();
        prop_assert_eq!(restored, store);
    }

    #[test]
    fn prop_rewrite_with_own_history_is_identity(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let store = run(&ops)?;
        let now = epoch() + Duration::days(2);

        let running = store.currently_clocked_in().map(|c| c.id.clone());

        // A replayed start is refused while a different clock is running.
        for clock in store.clocks().filter(|c| running.as_ref().map_or(true, |r| *r == c.id)) {
            let before = history(&store, &clock.id).unwrap();
            let events: Vec<TimedEvent> = before.iter().map(TimedEvent::from).collect();

            let rewritten = clock_rewrite(store.clone(), &clock.id, events).unwrap();

            prop_assert_eq!(history(&rewritten, &clock.id).unwrap(), before);
            prop_assert_eq!(list(&rewritten, now).unwrap(), list(&store, now).unwrap());
        }
    }

    #[test]
    fn prop_elapsed_matches_last_cumulative(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let store = run(&ops)?;

        for clock in store.clocks() {
            let entries = history(&store, &clock.id).unwrap();
            let last = entries.last().map(|e| e.cumulative_seconds).unwrap_or(0);
            match clock.status {
                ClockStatus::ClockReset => prop_assert_eq!(clock.elapsed_seconds, 0),
                ClockStatus::ClockedIn | ClockStatus::ClockedOut => {
                    prop_assert_eq!(clock.elapsed_seconds, last)
                }
            }
        }
    }
}
