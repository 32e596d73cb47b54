//! Event Sourcing Model
//!
//! - **`event`**: Clock events (start, stop, reset) and their time ordering.
//! - **`aggregate`**: The per-clock aggregate and figures derived from its history.
//! - **`store`**: All clocks keyed by id, and the merged global event log.

pub mod aggregate;
pub mod event;
pub mod store;

pub use aggregate::*;
pub use event::*;
pub use store::*;
