//! State-Transition Engine
//!
//! Pure functions over [`ClockStore`](crate::events::ClockStore) snapshots:
//!
//! - **`transition`**: `clock_in`, `clock_out`, `clock_reset`, `process_event`, `replay`.
//! - **`rewrite`**: Replace one clock's history by replaying a caller-supplied list.
//! - **`retention`**: Cut history back to a session boundary before a cutoff.
//! - **`projection`**: `list`, `current` and `history` views.

pub mod projection;
pub mod retention;
pub mod rewrite;
pub mod transition;

pub use projection::{current, history, list, live_elapsed, ClockSummary, HistoryEntry};
pub use retention::truncate_clockstore;
pub use rewrite::clock_rewrite;
pub use transition::{clock_in, clock_out, clock_reset, process_event, replay, validate_id};
