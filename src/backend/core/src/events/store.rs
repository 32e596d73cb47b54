//! The clock store: every clock keyed by id.
//!
//! Invariant: at most one clock in the store is `ClockedIn`. The store itself
//! does not enforce this; only the transition engine mutates clocks, and it
//! rejects any start that would break it.

use std::collections::BTreeMap;

use super::aggregate::{Clock, ClockStatus};
use super::event::{time_ordered, ClockEvent, EventKind, Timestamp};

/// Mapping from clock id to clock, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockStore {
    clocks: BTreeMap<String, Clock>,
}

impl ClockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Clock> {
        self.clocks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Clock> {
        self.clocks.get_mut(id)
    }

    /// Status of a clock, treating unknown ids as freshly reset.
    pub fn status_of(&self, id: &str) -> ClockStatus {
        self.clocks.get(id).map(|c| c.status).unwrap_or_default()
    }

    /// The clock for `id`, created reset if it did not exist.
    pub fn get_or_create(&mut self, id: &str) -> &mut Clock {
        self.clocks
            .entry(id.to_string())
            .or_insert_with(|| Clock::new(id))
    }

    /// Insert or replace a clock.
    pub fn insert(&mut self, clock: Clock) {
        self.clocks.insert(clock.id.clone(), clock);
    }

    pub fn clocks(&self) -> impl Iterator<Item = &Clock> {
        self.clocks.values()
    }

    pub fn clocks_mut(&mut self) -> impl Iterator<Item = &mut Clock> {
        self.clocks.values_mut()
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// Total events held across all clocks.
    pub fn event_count(&self) -> usize {
        self.clocks.values().map(|c| c.events.len()).sum()
    }

    /// The single clock that is clocked in, if any.
    pub fn currently_clocked_in(&self) -> Option<&Clock> {
        self.clocks
            .values()
            .find(|c| c.status == ClockStatus::ClockedIn)
    }

    /// Every event in the store as one time-ordered log.
    ///
    /// Each clock's own events keep their relative order. When events of
    /// different clocks share an instant, stops and resets come before starts,
    /// and a start whose session closes at that same instant comes before one
    /// that stays open, so the log replays cleanly from empty.
    pub fn ordered_events(&self) -> Vec<ClockEvent> {
        let queues: Vec<Vec<&ClockEvent>> = self.clocks.values().map(|c| time_ordered(&c.events)).collect();
        let mut heads = vec![0usize; queues.len()];

        let mut merged = Vec::with_capacity(self.event_count());
        while let Some(i) = (0..queues.len())
            .filter(|&i| heads[i] < queues[i].len())
            .min_by_key(|&i| merge_key(&queues[i][heads[i]..]))
        {
            merged.push(queues[i][heads[i]].clone());
            heads[i] += 1;
        }
        merged
    }
}

/// Order of the first event in `pending` against other clocks' next events.
fn merge_key(pending: &[&ClockEvent]) -> (Timestamp, u8) {
    let event = pending[0];
    let rank = match event.kind() {
        EventKind::Stop | EventKind::Reset => 0,
        EventKind::Start => match pending.get(1) {
            Some(next) if next.kind() == EventKind::Stop && next.timestamp() == event.timestamp() => 1,
            _ => 2,
        },
    };
    (*event.timestamp(), rank)
}
