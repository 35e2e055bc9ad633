//! # Sequence Gate - per-account ordering of submissions
//!
//! Holds submissions for one source account until the account's
//! authoritative sequence number says it is their turn.
//!
//! ## Algorithm
//!
//! ```text
//! push(ch, seq)        enqueue only, never releases
//! update(current):
//!   watermark = max(watermark, current + 1)
//!   while head.seq <= watermark:
//!       head.seq <  watermark  -> BadSequence  (slot already consumed)
//!       head.seq == watermark  -> go           (next in line)
//!   nothing popped && idle > timeout -> Timeout for every queued entry
//! ```
//!
//! Pushing never evaluates the queue, so every `push()` must be followed by
//! an `update()` carrying the account's current sequence.

use super::errors::{SubmissionError, SubmissionResult};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Default inactivity timeout before a stuck queue is flushed.
pub const DEFAULT_GATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome delivered to a queued submission: `Ok(())` means go.
pub type GateSignal = SubmissionResult<()>;

pub type GateSender = oneshot::Sender<GateSignal>;

pub type GateReceiver = oneshot::Receiver<GateSignal>;

/// A submission waiting for its sequence number to come up.
struct QueuedSubmission {
    sequence: u64,
    sender: GateSender,
}

impl PartialEq for QueuedSubmission {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for QueuedSubmission {}

impl PartialOrd for QueuedSubmission {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedSubmission {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence.cmp(&other.sequence)
    }
}

/// Counts of entries resolved by one `update()` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateUpdate {
    /// Entries released with a go signal
    pub released: usize,
    /// Entries rejected as bad sequence
    pub rejected: usize,
    /// Entries flushed by the inactivity timeout
    pub timed_out: usize,
}

impl GateUpdate {
    pub fn resolved(&self) -> usize {
        self.released + self.rejected + self.timed_out
    }
}

/// Submission queue for a single source account.
pub struct SequenceGate {
    /// Min-heap of waiting submissions by sequence
    queue: BinaryHeap<Reverse<QueuedSubmission>>,
    /// Next sequence the account will accept; never decreases
    next_sequence: u64,
    /// Last time an update resolved anything
    last_active_at: Instant,
    /// Inactivity timeout
    timeout: Duration,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_GATE_TIMEOUT, Instant::now())
    }

    pub fn with_timeout(timeout: Duration, now: Instant) -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_sequence: 0,
            last_active_at: now,
            timeout,
        }
    }

    /// Gate starting from a previously observed watermark
    pub fn resume(timeout: Duration, now: Instant, next_sequence: u64) -> Self {
        Self {
            next_sequence,
            ..Self::with_timeout(timeout, now)
        }
    }

    /// Number of queued submissions
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Current watermark (next expected sequence)
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Queue `sender` to be signalled once `sequence` is reached.
    pub fn push(&mut self, sender: GateSender, sequence: u64) {
        self.queue.push(Reverse(QueuedSubmission { sequence, sender }));
    }

    /// Report the account's latest sequence number.
    pub fn update(&mut self, current_sequence: u64) -> GateUpdate {
        self.update_at(current_sequence, Instant::now())
    }

    /// [`update`](Self::update) against an explicit clock reading.
    pub fn update_at(&mut self, current_sequence: u64, now: Instant) -> GateUpdate {
        let candidate = current_sequence.saturating_add(1);
        if candidate > self.next_sequence {
            self.next_sequence = candidate;
        }

        let mut update = GateUpdate::default();

        while let Some(Reverse(head)) = self.queue.peek() {
            if head.sequence > self.next_sequence {
                break;
            }
            let Some(Reverse(entry)) = self.queue.pop() else {
                break;
            };

            // A dropped receiver means the caller gave up; nothing to deliver
            if entry.sequence < self.next_sequence {
                let _ = entry.sender.send(Err(SubmissionError::BadSequence));
                update.rejected += 1;
            } else {
                let _ = entry.sender.send(Ok(()));
                update.released += 1;
            }
        }

        if update.resolved() > 0 {
            self.last_active_at = now;
            return update;
        }

        update.timed_out = self.expire_idle(now);
        update
    }

    /// Flush every queued entry with `Timeout` if the gate has been idle
    /// longer than its timeout. Leaves the watermark untouched, for accounts
    /// whose sequence could not be loaded.
    pub fn expire_idle(&mut self, now: Instant) -> usize {
        if now.saturating_duration_since(self.last_active_at) <= self.timeout {
            return 0;
        }

        let mut flushed = 0;
        while let Some(Reverse(entry)) = self.queue.pop() {
            let _ = entry.sender.send(Err(SubmissionError::Timeout));
            flushed += 1;
        }
        flushed
    }
}

impl Default for SequenceGate {
    fn default() -> Self {
        Self::new()
    }
}
