//! Durable storage backends for store snapshots.
//!
//! Provides:
//! - `JsonFileBackend`: one JSON file, replaced atomically on every save
//! - `MemoryBackend`: in-process storage for tests and ephemeral servers

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use super::codec::{decode_store, encode_store, from_json, to_json};
use crate::error::{ErrorCode, ErrorContext, PunchError, Result};
use crate::events::{ClockEvent, ClockStore};

// ═══════════════════════════════════════════════════════════════════════════════
// Backend Trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Storage for the durable event log.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Load the store. A backend with nothing stored yet yields an empty store.
    async fn load(&self) -> Result<ClockStore>;

    /// Replace the stored log with the given store's log.
    async fn save(&self, store: &ClockStore) -> Result<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON File Backend
// ═══════════════════════════════════════════════════════════════════════════════

/// Stores the log as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SnapshotBackend for JsonFileBackend {
    async fn load(&self) -> Result<ClockStore> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No clock store found, starting empty");
                return Ok(ClockStore::new());
            }
            Err(e) => return Err(e.into()),
        };

        let store = from_json(&json)?;
        info!(
            path = %self.path.display(),
            clocks = store.len(),
            events = store.event_count(),
            "Loaded clock store"
        );
        Ok(store)
    }

    async fn save(&self, store: &ClockStore) -> Result<()> {
        let json = to_json(store)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_error_code(ErrorCode::PersistenceFailed)?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json.as_bytes())
            .await
            .with_error_code(ErrorCode::PersistenceFailed)?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .with_error_code(ErrorCode::PersistenceFailed)?;

        debug!(path = %self.path.display(), events = store.event_count(), "Saved clock store");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// In-Memory Backend
// ═══════════════════════════════════════════════════════════════════════════════

/// Keeps the encoded log in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    events: Mutex<Vec<ClockEvent>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing log, as if it had been read from disk.
    pub fn with_events(events: Vec<ClockEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The last saved log.
    pub fn saved_events(&self) -> Vec<ClockEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl SnapshotBackend for MemoryBackend {
    async fn load(&self) -> Result<ClockStore> {
        let events = self.events.lock().clone();
        decode_store(&events)
    }

    async fn save(&self, store: &ClockStore) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PunchError::new(
                ErrorCode::PersistenceFailed,
                "Failed to write the clock store",
            ));
        }
        *self.events.lock() = encode_store(store);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
