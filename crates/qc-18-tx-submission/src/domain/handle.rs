//! Caller-facing handle for one submission attempt.

use super::errors::{SubmissionError, SubmissionResult};
use super::registry::{listener, ListenerReceiver};
use super::types::{TransactionHash, TxResult};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot::error::TryRecvError;

pin_project! {
    /// Resolves to exactly one terminal outcome for a submitted envelope.
    ///
    /// Dropping the handle abandons the wait; the eventual delivery is
    /// discarded. If the registry drops the listener without delivering
    /// (expired by `clean()`), the handle resolves to `Timeout`.
    #[must_use = "a submission handle does nothing unless awaited or polled"]
    pub struct SubmissionHandle {
        hash: TransactionHash,
        #[pin]
        rx: ListenerReceiver,
    }
}

impl SubmissionHandle {
    pub fn new(hash: TransactionHash, rx: ListenerReceiver) -> Self {
        Self { hash, rx }
    }

    /// Handle whose outcome is already known
    pub fn ready(hash: TransactionHash, outcome: SubmissionResult<TxResult>) -> Self {
        let (tx, rx) = listener();
        // The receiver is alive in this scope, so the send cannot fail
        let _ = tx.send(outcome);
        Self { hash, rx }
    }

    /// Hash of the submitted transaction
    pub fn hash(&self) -> TransactionHash {
        self.hash
    }

    /// Poll without blocking. `None` while the outcome is still unknown.
    pub fn try_outcome(&mut self) -> Option<SubmissionResult<TxResult>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(SubmissionError::Timeout)),
        }
    }
}

impl Future for SubmissionHandle {
    type Output = SubmissionResult<TxResult>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        match this.rx.poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(SubmissionError::Timeout)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl std::fmt::Debug for SubmissionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionHandle")
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}
