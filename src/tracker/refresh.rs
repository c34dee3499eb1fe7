//! Background refreshing.
//!
//! [`supervise`] is the task [`Tracker::start`](super::Tracker::start)
//! spawns.  It runs the refresh loop in a child task so that a panic in loop
//! bookkeeping is observed, logged and followed by a fresh loop one interval
//! later.
//!
//! The loop itself is plain: refresh every key, sleep, repeat.
//! Keys are fetched one at a time in construction order and the store lock
//! is released between keys, so drains may interleave anywhere in a cycle.
//! Each fetch runs in its own task; a fetch that panics is cached as an
//! error item like any other failure and the cycle moves on to the next key.

use std::any::Any;
use std::future::Future;
use std::sync::{Arc, PoisonError};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{PushOutcome, RefreshSummary, Shared, FETCH_ERROR_PREFIX};

/// Keep a refresh loop alive until shutdown.
///
/// `worker` builds the loop; [`Tracker::start`](super::Tracker::start)
/// passes [`run_loop`].
pub(super) async fn supervise<W, F>(shared: Arc<Shared>, worker: W)
where
    W: Fn(Arc<Shared>) -> F,
    F: Future<Output = ()> + Send + 'static,
{
    loop {
        let handle = tokio::spawn(worker(Arc::clone(&shared)));
        match handle.await {
            Ok(()) => break,
            Err(e) if e.is_panic() => {
                error!(error = %e, "refresh loop crashed; restarting after one interval");
                if !pause(&shared).await {
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "refresh loop cancelled");
                break;
            }
        }
    }
    info!("refresh loop stopped");
}

/// Refresh, sleep, repeat.  Returns only once shutdown is requested.
pub(super) async fn run_loop(shared: Arc<Shared>) {
    loop {
        shared.refresh_all().await;
        if !pause(&shared).await {
            return;
        }
    }
}

/// Sleep for one refresh interval.  Returns `false` if shutdown was
/// requested first.
async fn pause(shared: &Shared) -> bool {
    tokio::select! {
        _ = shared.shutdown.cancelled() => false,
        _ = tokio::time::sleep(shared.refresh_interval) => true,
    }
}

impl Shared {
    /// One pass over every key.
    ///
    /// The capacity check and the append each take the lock briefly; the
    /// fetch in between runs unlocked.  A count read before the fetch may be
    /// stale by the time the result is appended, but `push` re-checks
    /// uniqueness and capacity under the lock.
    pub(super) async fn refresh_all(&self) -> RefreshSummary {
        let keys = self.lock_store().keys().to_vec();
        let mut summary = RefreshSummary::default();

        for key in &keys {
            if self.shutdown.is_cancelled() {
                debug!("shutdown requested; ending refresh cycle early");
                break;
            }

            let full = self.lock_store().is_full(key);
            if full {
                info!(key = %key, "skipping fetch: cache is full");
                summary.skipped += 1;
                continue;
            }

            summary.fetched += 1;
            let candidate = self.fetch_one(key).await;

            let outcome = self.lock_store().push(key, candidate);
            match outcome {
                PushOutcome::Stored => {
                    summary.stored += 1;
                    info!(key = %key, "stored news item");
                }
                PushOutcome::Duplicate => debug!(key = %key, "duplicate item ignored"),
                PushOutcome::Empty => debug!(key = %key, "empty item ignored"),
                PushOutcome::Full => debug!(key = %key, "cache filled during fetch; item dropped"),
                PushOutcome::UnknownKey => warn!(key = %key, "key vanished from store"),
            }
        }

        *self
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
        debug!(
            fetched = summary.fetched,
            skipped = summary.skipped,
            stored = summary.stored,
            pending = ?self.lock_store().pending(),
            "refresh cycle complete"
        );
        summary
    }

    /// Fetch `key` in a task of its own and turn every failure, panics
    /// included, into the cached error text.
    async fn fetch_one(&self, key: &str) -> String {
        let fetcher = Arc::clone(&self.fetcher);
        let owned = key.to_string();
        let task = tokio::spawn(async move { fetcher.fetch(&owned).await });

        match task.await {
            Ok(Ok(text)) => {
                debug!(key = %key, text = %text, "fetched news");
                text
            }
            Ok(Err(e)) => {
                warn!(key = %key, error = %e, "fetch failed; caching the error");
                format!("{FETCH_ERROR_PREFIX}{e}")
            }
            Err(e) if e.is_panic() => {
                let message = panic_message(e.into_panic());
                error!(key = %key, panic = %message, "fetch panicked; caching the error");
                format!("{FETCH_ERROR_PREFIX}fetch panicked: {message}")
            }
            Err(e) => {
                warn!(key = %key, error = %e, "fetch task cancelled; caching the error");
                format!("{FETCH_ERROR_PREFIX}{e}")
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map_or_else(|| "unknown panic".to_string(), |s| s.to_string()),
    }
}
