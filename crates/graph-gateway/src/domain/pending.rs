//! Correlation Store - the pending table behind request/response exchanges.
//!
//! Maps correlation IDs to a single-shot wait handle and, once the reply has
//! arrived, to its payload. Shared by every HTTP handler and every streaming
//! connection.

use crate::domain::correlation::CorrelationId;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::debug;

/// Single-shot signal a suspended task waits on.
///
/// Goes from unset to set at most once. Resolving an already set handle is a
/// no-op.
#[derive(Debug)]
pub struct WaitHandle {
    receiver: watch::Receiver<bool>,
}

/// The pending entry behind a [`WaitHandle`] was replaced or removed before
/// it was ever set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("wait handle abandoned before it was set")]
pub struct Abandoned;

impl WaitHandle {
    /// Check whether the handle has been set.
    pub fn is_set(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until the handle is set.
    ///
    /// Returns immediately if it already is. Fails with [`Abandoned`] when the
    /// entry disappears unset, which happens when a reused identifier
    /// overwrites it.
    pub async fn wait(&mut self) -> Result<(), Abandoned> {
        self.receiver
            .wait_for(|set| *set)
            .await
            .map(|_| ())
            .map_err(|_| Abandoned)
    }
}

/// Which path a call to [`CorrelationStore::resolve`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A pending entry existed; its result was stored and its handle set.
    Resolved,
    /// No pending entry; the payload became the Last-Observed State.
    Observed,
}

/// A pending exchange
struct PendingEntry {
    /// Setter side of the wait handle
    signal: watch::Sender<bool>,
    /// Reply payload, present once resolved
    result: Option<serde_json::Value>,
    /// When the entry was registered
    registered_at: Instant,
}

/// Statistics for the correlation store
#[derive(Debug, Default)]
pub struct CorrelationStats {
    /// Entries registered
    pub total_registered: AtomicU64,
    /// Payloads delivered to a pending entry
    pub total_resolved: AtomicU64,
    /// Payloads that landed in Last-Observed State
    pub total_observed: AtomicU64,
    /// Exchanges that gave up waiting
    pub total_timeouts: AtomicU64,
}

impl CorrelationStats {
    /// Snapshot as JSON for the health endpoint
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "registered": self.total_registered.load(Ordering::Relaxed),
            "resolved": self.total_resolved.load(Ordering::Relaxed),
            "observed": self.total_observed.load(Ordering::Relaxed),
            "timeouts": self.total_timeouts.load(Ordering::Relaxed),
        })
    }
}

/// In-memory pending table plus the Last-Observed State cell.
///
/// Flow:
/// 1. Coordinator calls `register()` and keeps the returned [`WaitHandle`]
/// 2. Coordinator publishes the request to every connected editor
/// 3. An editor's reply arrives and someone calls `resolve()`
/// 4. Coordinator wakes (or times out) and calls `get_and_clear()`
///
/// Every operation on one identifier runs under that key's shard lock, so a
/// single identifier's lifecycle is totally ordered.
pub struct CorrelationStore {
    /// Map of correlation ID to pending entry
    pending: DashMap<CorrelationId, PendingEntry>,
    /// Most recent untagged (or unmatched) push
    last_observed: RwLock<Option<serde_json::Value>>,
    /// Statistics
    stats: Arc<CorrelationStats>,
}

impl CorrelationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            last_observed: RwLock::new(None),
            stats: Arc::new(CorrelationStats::default()),
        }
    }

    /// Register a pending exchange and get its wait handle.
    ///
    /// Overwrites any entry already registered under `id`. The waiter on the
    /// overwritten entry sees [`Abandoned`].
    pub fn register(&self, id: &CorrelationId) -> WaitHandle {
        let (signal, receiver) = watch::channel(false);

        let entry = PendingEntry {
            signal,
            result: None,
            registered_at: Instant::now(),
        };

        if self.pending.insert(id.clone(), entry).is_some() {
            debug!(request_id = %id, "Overwrote pending entry for reused id");
        }
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(request_id = %id, "Registered pending exchange");

        WaitHandle { receiver }
    }

    /// Deliver a payload.
    ///
    /// If `id` is pending, stores `payload` as its result and sets its wait
    /// handle. A second delivery to the same entry overwrites the result and
    /// leaves the handle set. Otherwise `payload` replaces the Last-Observed
    /// State and nothing else happens.
    pub fn resolve(&self, id: &CorrelationId, payload: serde_json::Value) -> Resolution {
        if let Some(mut entry) = self.pending.get_mut(id) {
            entry.result = Some(payload);
            entry.signal.send_replace(true);
            self.stats.total_resolved.fetch_add(1, Ordering::Relaxed);

            debug!(
                request_id = %id,
                latency_ms = entry.registered_at.elapsed().as_millis(),
                "Resolved pending exchange"
            );
            Resolution::Resolved
        } else {
            debug!(request_id = %id, "No pending exchange, keeping as last observed state");
            self.observe(payload);
            Resolution::Observed
        }
    }

    /// Replace the Last-Observed State with an untagged push.
    pub fn observe(&self, payload: serde_json::Value) {
        *self.last_observed.write() = Some(payload);
        self.stats.total_observed.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove the entry for `id` and return its result.
    ///
    /// Destructive: a given identifier yields its result at most once.
    /// Returns `None` when no entry exists or the entry was never resolved.
    pub fn get_and_clear(&self, id: &CorrelationId) -> Option<serde_json::Value> {
        self.pending.remove(id).and_then(|(_, entry)| entry.result)
    }

    /// Get a copy of the Last-Observed State
    pub fn last_observed(&self) -> Option<serde_json::Value> {
        self.last_observed.read().clone()
    }

    /// Get number of currently pending exchanges
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.pending.contains_key(id)
    }

    /// Record an exchange that gave up waiting
    pub(crate) fn record_timeout(&self) {
        self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get statistics
    pub fn stats(&self) -> &CorrelationStats {
        &self.stats
    }
}

impl Default for CorrelationStore {
    fn default() -> Self {
        Self::new()
    }
}
