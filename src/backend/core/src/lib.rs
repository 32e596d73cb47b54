#![allow(clippy::result_large_err)]
//! # Punchclock Core
//!
//! Event-sourced work clocks.
//!
//! ## Architecture
//!
//! - **Events**: Immutable start/stop/reset events, per-clock aggregates and the clock store
//! - **Engine**: Pure state transitions, history rewrite, retention and read projections
//! - **Persistence**: Time-ordered JSON event log with pluggable backends
//! - **Service**: Serialized access to the store with write-through persistence
//! - **Text**: Semicolon-delimited history and rewrite interchange
//! - **API**: JSON-RPC 2.0 over HTTP
//! - **Telemetry**: Structured logging and metrics descriptions

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod persistence;
pub mod service;
pub mod telemetry;
pub mod text;

pub use error::{ErrorCode, ErrorContext, ErrorDetails, ErrorSeverity, PunchError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::engine::{
        clock_in, clock_out, clock_reset, clock_rewrite, process_event, replay, truncate_clockstore,
        ClockSummary, HistoryEntry,
    };
    pub use crate::error::{ErrorCode, ErrorContext, ErrorDetails, ErrorSeverity, PunchError, Result};
    pub use crate::events::{
        Clock, ClockEvent, ClockStatus, ClockStore, EventKind, TimedEvent, Timestamp,
    };
    pub use crate::persistence::{JsonFileBackend, MemoryBackend, SnapshotBackend};
    pub use crate::service::{ClockService, FixedTimeSource, SystemTimeSource, TimeSource};
}
