//! Persistence Codec
//!
//! - **`codec`**: Store to time-ordered event log and back (JSON).
//! - **`backend`**: The `SnapshotBackend` trait with file and in-memory implementations.

pub mod backend;
pub mod codec;

pub use backend::{JsonFileBackend, MemoryBackend, SnapshotBackend};
pub use codec::{decode_store, encode_store, from_json, to_json};
