//! The news tracker: a per-key cache refreshed in the background and drained
//! by consumers.
//!
//! ## Architecture overview
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!   start() ────► │ supervisor task (refresh.rs) │
//!                 │   └─ refresh loop            │── fetch() ──► Fetcher
//!                 └──────────────┬──────────────┘
//!                                │ push (short lock)
//!                                ▼
//!                        ┌───────────────┐
//!                        │  NewsStore    │◄── get_and_clear / get_and_clear_all
//!                        │  (Mutex)      │    (short lock, atomic read+clear)
//!                        └───────────────┘
//! ```
//!
//! * **`store`**: the bounded, de-duplicated lists and miss counters.  Pure
//!   synchronous data.
//! * **`refresh`**: the background loop, its supervisor and one refresh
//!   cycle.  The store lock is never held across a fetch or a sleep.
//! * **this module**: [`Tracker`], the handle everything else holds.
//!
//! Every item that enters the store leaves it through exactly one drain.

mod refresh;
mod store;

pub use store::{NewsStore, PushOutcome};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::source::Fetcher;

/// Prefix of the item cached in place of a failed fetch.
pub const FETCH_ERROR_PREFIX: &str = "Error fetching news: ";

/// What one refresh cycle did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Keys the fetcher was called for.
    pub fetched: usize,
    /// Keys skipped because they were at capacity.
    pub skipped: usize,
    /// New items appended to the store.
    pub stored: usize,
}

/// State shared between the [`Tracker`] handle and its background task.
struct Shared {
    fetcher: Arc<dyn Fetcher>,
    refresh_interval: Duration,
    store: Mutex<NewsStore>,
    last_refresh: Mutex<Option<DateTime<Utc>>>,
    shutdown: CancellationToken,
}

impl Shared {
    fn lock_store(&self) -> MutexGuard<'_, NewsStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the news cache and its refresh loop.
///
/// Create one per process, wrap it in an [`Arc`] and hand clones to every
/// consumer.  All cache access goes through one mutex held only for map
/// reads and writes.
pub struct Tracker {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Tracker {
    /// Create a tracker with an empty list for every configured key.
    /// Nothing runs until [`start()`](Tracker::start).
    pub fn new(config: TrackerConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        info!(
            keys = ?config.keys,
            capacity = config.capacity,
            interval_secs = config.refresh_interval.as_secs(),
            "tracker created"
        );
        let store = NewsStore::new(&config.keys, config.capacity);
        Self {
            shared: Arc::new(Shared {
                fetcher,
                refresh_interval: config.refresh_interval,
                store: Mutex::new(store),
                last_refresh: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Launch the background refresh loop.
    ///
    /// Idempotent: a second call (or a call after [`shutdown()`](Tracker::shutdown))
    /// does nothing.  Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            debug!("refresh loop already started");
            return;
        }
        if self.shared.shutdown.is_cancelled() {
            warn!("tracker already shut down; not starting refresh loop");
            return;
        }
        *task = Some(tokio::spawn(refresh::supervise(
            Arc::clone(&self.shared),
            refresh::run_loop,
        )));
        info!("refresh loop started");
    }

    /// Whether the background loop is currently alive.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the refresh loop and wait for it to exit.
    ///
    /// A sleeping loop stops at once.  A fetch already in flight is allowed
    /// to finish and its result is stored; remaining keys in that cycle are
    /// not fetched.  Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        self.shared.shutdown.cancel();
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "refresh task ended abnormally");
            }
            info!("tracker shut down");
        }
    }

    /// Run one refresh cycle over every key now, independent of the loop.
    #[cfg(test)]
    pub async fn refresh_all(&self) -> RefreshSummary {
        self.shared.refresh_all().await
    }

    /// Take every undelivered item for `key`.
    ///
    /// Unknown keys return an empty list and leave the store untouched.
    pub fn get_and_clear(&self, key: &str) -> Vec<String> {
        let items = self.shared.lock_store().drain(key);
        debug!(key = %key, count = items.len(), "drained key");
        items
    }

    /// Take every undelivered item for every key under a single lock,
    /// in key construction order.
    pub fn get_and_clear_all(&self) -> Vec<(String, Vec<String>)> {
        let all = self.shared.lock_store().drain_all();
        debug!(
            count = all.iter().map(|(_, items)| items.len()).sum::<usize>(),
            "drained all keys"
        );
        all
    }

    /// Undelivered item counts per key, without draining.
    pub fn pending(&self) -> Vec<(String, usize)> {
        self.shared.lock_store().pending()
    }

    /// The fixed key set.
    pub fn keys(&self) -> Vec<String> {
        self.shared.lock_store().keys().to_vec()
    }

    /// Miss counter for `key` (`None` for unknown keys).
    #[allow(dead_code)]
    pub fn missed_cycles(&self, key: &str) -> Option<u32> {
        self.shared.lock_store().missed_cycles(key)
    }

    /// When the last full refresh cycle finished.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self
            .shared
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
