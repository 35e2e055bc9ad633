//! Open Submission Registry - deduplicates callers waiting on one transaction.
//!
//! Maps a transaction hash to every listener waiting for its outcome. The
//! first unresolved submission of a hash creates the entry; later duplicates
//! append to it. One `finish()` fans the result out to all of them.
//!
//! Flow:
//! 1. Orchestrator forwards an envelope and the network accepts it
//! 2. Orchestrator calls `add()` with a fresh oneshot sender
//! 3. Reconciliation tick finds the ledger result and calls `finish()`
//! 4. Entries nobody resolved are dropped by `clean()`; their receivers
//!    observe a closed channel

use super::errors::SubmissionResult;
use super::types::{TransactionHash, TxResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Single-slot, write-once delivery channel for one waiting caller.
///
/// A oneshot sender always has exactly one buffered slot, so a listener can
/// never block the registry while it holds its lock.
pub type Listener = oneshot::Sender<SubmissionResult<TxResult>>;

/// Receiving half of a [`Listener`]
pub type ListenerReceiver = oneshot::Receiver<SubmissionResult<TxResult>>;

/// Create a listener pair
pub fn listener() -> (Listener, ListenerReceiver) {
    oneshot::channel()
}

/// Bookkeeping for one hash awaiting resolution
struct OpenSubmission {
    /// When the first listener registered
    submitted_at: Instant,
    /// Waiting callers, in registration order
    listeners: Vec<Listener>,
}

/// Statistics for the registry
#[derive(Debug, Default)]
pub struct RegistryStats {
    /// Listeners registered
    pub total_added: AtomicU64,
    /// Results handed to a live receiver
    pub total_delivered: AtomicU64,
    /// Results whose receiver was already gone
    pub total_abandoned: AtomicU64,
    /// Open submissions swept by `clean()`
    pub total_cleaned: AtomicU64,
}

/// Registry of open submissions keyed by transaction hash.
pub struct OpenSubmissionRegistry {
    submissions: Mutex<HashMap<TransactionHash, OpenSubmission>>,
    stats: RegistryStats,
}

impl OpenSubmissionRegistry {
    pub fn new() -> Self {
        Self {
            submissions: Mutex::new(HashMap::new()),
            stats: RegistryStats::default(),
        }
    }

    /// Register `listener` to be notified when `hash` resolves.
    pub fn add(&self, hash: TransactionHash, listener: Listener) {
        let mut submissions = self.submissions.lock();

        let open = submissions.entry(hash).or_insert_with(|| OpenSubmission {
            submitted_at: Instant::now(),
            listeners: Vec::new(),
        });
        open.listeners.push(listener);
        let waiting = open.listeners.len();
        drop(submissions);

        self.stats.total_added.fetch_add(1, Ordering::Relaxed);
        debug!(tx_hash = %hash, listeners = waiting, "Registered submission listener");
    }

    /// Deliver `result` to every listener of `result.hash` and drop the entry.
    ///
    /// Returns the number of listeners that were still waiting. Resolving a
    /// hash that is not tracked is a no-op returning 0.
    pub fn finish(&self, result: &TxResult) -> usize {
        let Some(open) = self.submissions.lock().remove(&result.hash) else {
            return 0;
        };

        let mut delivered = 0;
        for listener in open.listeners {
            match listener.send(Ok(result.clone())) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    // Receiver dropped: caller abandoned the handle
                    self.stats.total_abandoned.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        self.stats
            .total_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);

        debug!(
            tx_hash = %result.hash,
            ledger = result.ledger_sequence,
            delivered = delivered,
            waited_ms = open.submitted_at.elapsed().as_millis() as u64,
            "Finished open submission"
        );
        delivered
    }

    /// Remove every open submission older than `max_age` without delivering.
    ///
    /// Returns the number of submissions removed.
    pub fn clean(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.submissions.lock().retain(|hash, open| {
            let age = now.saturating_duration_since(open.submitted_at);
            if age > max_age {
                warn!(
                    tx_hash = %hash,
                    age_ms = age.as_millis() as u64,
                    listeners = open.listeners.len(),
                    "Dropping expired open submission"
                );
                removed += 1;
                false
            } else {
                true
            }
        });

        self.stats
            .total_cleaned
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Snapshot of the hashes currently awaiting resolution
    pub fn pending(&self) -> Vec<TransactionHash> {
        self.submissions.lock().keys().copied().collect()
    }

    pub fn is_pending(&self, hash: &TransactionHash) -> bool {
        self.submissions.lock().contains_key(hash)
    }

    /// Number of callers waiting on `hash`
    pub fn listener_count(&self, hash: &TransactionHash) -> usize {
        self.submissions
            .lock()
            .get(hash)
            .map(|open| open.listeners.len())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.submissions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.lock().is_empty()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }
}

impl Default for OpenSubmissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
