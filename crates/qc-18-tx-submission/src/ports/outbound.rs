//! Outbound (Driven) ports for the Transaction Submission subsystem.
//!
//! The network, the ledger result store and the account sequence store are
//! external services with their own synchronization. No lock is held while
//! any of these is called.

use crate::domain::{
    AccountAddress, SubmissionResult, TransactionEnvelope, TransactionHash, TxResult,
};
use async_trait::async_trait;

/// Forwards envelopes to the consensus network.
#[async_trait]
pub trait NetworkSubmitter: Send + Sync {
    /// Submit an envelope.
    ///
    /// # Returns
    /// - `Ok(())`: accepted for consideration; the outcome is learned later
    /// - `Err(SubmissionError::BadSequence)`: sequence already consumed
    /// - `Err(_)`: any other rejection
    async fn submit(&self, envelope: &TransactionEnvelope) -> SubmissionResult<()>;
}

/// Read access to results observed on the ledger.
#[async_trait]
pub trait ResultSource: Send + Sync {
    /// Result of the transaction with `hash`, if it has been applied.
    async fn result_by_hash(&self, hash: &TransactionHash) -> SubmissionResult<Option<TxResult>>;

    /// Result of the transaction applied at `sequence` for `address`.
    async fn result_by_address_and_sequence(
        &self,
        address: &AccountAddress,
        sequence: u64,
    ) -> SubmissionResult<Option<TxResult>>;
}

/// Authoritative account sequence numbers.
#[async_trait]
pub trait SequenceProvider: Send + Sync {
    /// Current sequence of `address`, or `None` if the account is unknown.
    async fn current_sequence(&self, address: &AccountAddress) -> SubmissionResult<Option<u64>>;
}

#[cfg(test)]
pub use mocks::*;

#[cfg(test)]
mod mocks {
    use super::*;
    use crate::domain::SubmissionError;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Submitter returning a canned outcome and counting calls.
    pub struct MockSubmitter {
        outcome: Mutex<SubmissionResult<()>>,
        calls: AtomicUsize,
    }

    impl MockSubmitter {
        pub fn new() -> Self {
            Self {
                outcome: Mutex::new(Ok(())),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_outcome(self, outcome: SubmissionResult<()>) -> Self {
            *self.outcome.lock() = outcome;
            self
        }

        pub fn was_submitted_to(&self) -> bool {
            self.calls() > 0
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NetworkSubmitter for MockSubmitter {
        async fn submit(&self, _envelope: &TransactionEnvelope) -> SubmissionResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.lock().clone()
        }
    }

    /// Result source backed by in-memory maps.
    pub struct MockResultSource {
        by_hash: Mutex<HashMap<TransactionHash, TxResult>>,
        by_sequence: Mutex<HashMap<(AccountAddress, u64), TxResult>>,
        failure: Mutex<Option<SubmissionError>>,
    }

    impl MockResultSource {
        pub fn new() -> Self {
            Self {
                by_hash: Mutex::new(HashMap::new()),
                by_sequence: Mutex::new(HashMap::new()),
                failure: Mutex::new(None),
            }
        }

        pub fn with_result(self, result: TxResult) -> Self {
            self.insert(result);
            self
        }

        pub fn with_sequence_result(
            self,
            address: AccountAddress,
            sequence: u64,
            result: TxResult,
        ) -> Self {
            self.by_sequence.lock().insert((address, sequence), result);
            self
        }

        pub fn insert(&self, result: TxResult) {
            self.by_hash.lock().insert(result.hash, result);
        }

        pub fn fail_with(&self, error: SubmissionError) {
            *self.failure.lock() = Some(error);
        }
    }

    #[async_trait]
    impl ResultSource for MockResultSource {
        async fn result_by_hash(
            &self,
            hash: &TransactionHash,
        ) -> SubmissionResult<Option<TxResult>> {
            if let Some(err) = self.failure.lock().clone() {
                return Err(err);
            }
            Ok(self.by_hash.lock().get(hash).cloned())
        }

        async fn result_by_address_and_sequence(
            &self,
            address: &AccountAddress,
            sequence: u64,
        ) -> SubmissionResult<Option<TxResult>> {
            if let Some(err) = self.failure.lock().clone() {
                return Err(err);
            }
            Ok(self
                .by_sequence
                .lock()
                .get(&(address.clone(), sequence))
                .cloned())
        }
    }

    /// Sequence provider backed by a map.
    pub struct MockSequenceProvider {
        sequences: Mutex<HashMap<AccountAddress, u64>>,
        failure: Mutex<Option<SubmissionError>>,
    }

    impl MockSequenceProvider {
        pub fn new() -> Self {
            Self {
                sequences: Mutex::new(HashMap::new()),
                failure: Mutex::new(None),
            }
        }

        pub fn fail_with(&self, error: SubmissionError) {
            *self.failure.lock() = Some(error);
        }

        pub fn with_sequence(self, address: AccountAddress, sequence: u64) -> Self {
            self.set(address, sequence);
            self
        }

        pub fn set(&self, address: AccountAddress, sequence: u64) {
            self.sequences.lock().insert(address, sequence);
        }
    }

    #[async_trait]
    impl SequenceProvider for MockSequenceProvider {
        async fn current_sequence(
            &self,
            address: &AccountAddress,
        ) -> SubmissionResult<Option<u64>> {
            if let Some(err) = self.failure.lock().clone() {
                return Err(err);
            }
            Ok(self.sequences.lock().get(address).copied())
        }
    }
}
