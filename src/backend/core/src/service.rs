//! Clock Service
//!
//! The single serialization point for every operation on the store. Each
//! mutation computes the next snapshot from a copy of the current one, installs
//! it, and then writes it through to the configured [`SnapshotBackend`].
//!
//! A failed write is reported as `PersistenceFailed` even though the in-memory
//! store has already moved on; the next successful write catches the backend up.

use chrono::{Duration, Local};
use metrics::counter;
use parking_lot::Mutex as SyncMutex;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::engine::{self, ClockSummary, HistoryEntry};
use crate::error::Result;
use crate::events::{ClockStore, TimedEvent, Timestamp};
use crate::persistence::SnapshotBackend;

// ═══════════════════════════════════════════════════════════════════════════════
// Time Sources
// ═══════════════════════════════════════════════════════════════════════════════

/// Supplies "now" for every operation.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Local wall-clock time, with the local offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Local::now().into()
    }
}

/// A settable clock.
#[derive(Debug)]
pub struct FixedTimeSource {
    now: SyncMutex<Timestamp>,
}

impl FixedTimeSource {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: SyncMutex::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Service
// ═══════════════════════════════════════════════════════════════════════════════

/// Owns the store and serializes access to it.
pub struct ClockService {
    store: Mutex<ClockStore>,
    backend: Arc<dyn SnapshotBackend>,
    time: Arc<dyn TimeSource>,
    retention: Option<Duration>,
}

impl ClockService {
    /// Load the store from `backend`.
    ///
    /// When `retention` is set, history older than `now - retention` is
    /// truncated on every write.
    pub async fn open(
        backend: Arc<dyn SnapshotBackend>,
        time: Arc<dyn TimeSource>,
        retention: Option<Duration>,
    ) -> Result<Self> {
        let store = backend.load().await?;
        info!(
            backend = %backend.describe(),
            clocks = store.len(),
            events = store.event_count(),
            active = store.currently_clocked_in().map(|c| c.id.as_str()).unwrap_or("-"),
            "Clock store opened"
        );

        Ok(Self {
            store: Mutex::new(store),
            backend,
            time,
            retention,
        })
    }

    /// Start clock `id`.
    #[instrument(skip(self))]
    pub async fn start(&self, id: &str) -> Result<()> {
        let now = self.time.now();
        self.mutate("start", |store| Ok((engine::clock_in(store, id, now)?, ())))
            .await
    }

    /// Stop clock `id`.
    #[instrument(skip(self))]
    pub async fn stop(&self, id: &str) -> Result<()> {
        let now = self.time.now();
        self.mutate("stop", |store| Ok((engine::clock_out(store, id, now)?, ())))
            .await
    }

    /// Reset clock `id`, returning the seconds it had accumulated.
    #[instrument(skip(self))]
    pub async fn finish(&self, id: &str) -> Result<i64> {
        let now = self.time.now();
        self.mutate("finish", |store| engine::clock_reset(store, id, now))
            .await
    }

    /// Replace the history of clock `id`.
    #[instrument(skip(self, events), fields(events = events.len()))]
    pub async fn rewrite(&self, id: &str, events: Vec<TimedEvent>) -> Result<()> {
        self.mutate("rewrite", |store| Ok((engine::clock_rewrite(store, id, events)?, ())))
            .await
    }

    /// All clocks with live elapsed time.
    pub async fn list(&self) -> Result<Vec<ClockSummary>> {
        let now = self.time.now();
        let store = self.store.lock().await;
        engine::list(&store, now)
    }

    /// Id of the running clock, if any.
    pub async fn current(&self) -> Option<String> {
        engine::current(&*self.store.lock().await)
    }

    /// Annotated history of clock `id`.
    pub async fn history(&self, id: &str) -> Result<Vec<HistoryEntry>> {
        engine::history(&*self.store.lock().await, id)
    }

    /// A copy of the current store.
    pub async fn snapshot(&self) -> ClockStore {
        self.store.lock().await.clone()
    }

    pub fn backend(&self) -> &Arc<dyn SnapshotBackend> {
        &self.backend
    }

    async fn mutate<T, F>(&self, operation: &'static str, apply: F) -> Result<T>
    where
        F: FnOnce(ClockStore) -> Result<(ClockStore, T)>,
    {
        let mut guard = self.store.lock().await;

        let (next, output) = match apply(guard.clone()) {
            Ok(result) => result,
            Err(e) => {
                e.log();
                return Err(e);
            }
        };

        let next = match self.retention {
            Some(retention) => {
                let now = self.time.now();
                engine::truncate_clockstore(next, now - retention, now)
            }
            None => next,
        };

        *guard = next;
        counter!("punchclock_operations_total", "operation" => operation).increment(1);

        if let Err(e) = self.backend.save(&guard).await {
            warn!(operation, backend = %self.backend.describe(), "Write-through failed");
            e.log();
            return Err(e);
        }

        Ok(output)
    }
}

impl std::fmt::Debug for ClockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockService")
            .field("backend", &self.backend.describe())
            .field("retention", &self.retention)
            .finish()
    }
}
