//! In-memory ledger.
//!
//! Plays all three outbound roles for the simulator and integration tests:
//! it accepts envelopes into a queue, applies them when a ledger closes and
//! serves results and account sequences from what it applied.

use crate::domain::{
    AccountAddress, NetworkId, SubmissionError, SubmissionResult, TransactionEnvelope,
    TransactionHash, TxResult,
};
use crate::ports::outbound::{NetworkSubmitter, ResultSource, SequenceProvider};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Default)]
struct LedgerState {
    ledger_sequence: u64,
    accounts: HashMap<AccountAddress, u64>,
    queue: Vec<(TransactionHash, TransactionEnvelope)>,
    results: HashMap<TransactionHash, TxResult>,
    by_sequence: HashMap<(AccountAddress, u64), TransactionHash>,
}

impl LedgerState {
    /// Sequence the next accepted envelope from `address` must carry
    fn next_sequence(&self, address: &AccountAddress, current: u64) -> u64 {
        let queued = self
            .queue
            .iter()
            .filter(|(_, envelope)| &envelope.source == address)
            .count() as u64;
        current + queued + 1
    }
}

pub struct InMemoryLedger {
    network_id: NetworkId,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new(network_id: NetworkId) -> Self {
        Self {
            network_id,
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Create (or reset) an account at `sequence`.
    pub fn fund(&self, address: impl Into<AccountAddress>, sequence: u64) {
        let address = address.into();
        debug!(account = %address, sequence, "Funded account");
        self.state.lock().accounts.insert(address, sequence);
    }

    /// Apply every queued envelope and advance the ledger. Returns the
    /// results recorded by this close.
    pub fn close_ledger(&self) -> Vec<TxResult> {
        let mut state = self.state.lock();
        state.ledger_sequence += 1;
        let ledger_sequence = state.ledger_sequence;

        let queue = std::mem::take(&mut state.queue);
        let mut applied = Vec::with_capacity(queue.len());

        for (hash, envelope) in queue {
            let current = state.accounts.get(&envelope.source).copied().unwrap_or(0);
            let error = (envelope.sequence != current + 1).then(|| "tx_bad_seq".to_string());
            if error.is_none() {
                state.accounts.insert(envelope.source.clone(), envelope.sequence);
                state
                    .by_sequence
                    .insert((envelope.source.clone(), envelope.sequence), hash);
            }

            let result = TxResult {
                hash,
                ledger_sequence,
                envelope: envelope.encoded.clone(),
                result_payload: if error.is_none() {
                    "tx_success".to_string()
                } else {
                    "tx_failed".to_string()
                },
                error,
            };
            state.results.insert(hash, result.clone());
            applied.push(result);
        }

        info!(ledger = ledger_sequence, applied = applied.len(), "Ledger closed");
        applied
    }

    pub fn ledger_sequence(&self) -> u64 {
        self.state.lock().ledger_sequence
    }

    /// Envelopes waiting for the next close
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }
}

#[async_trait]
impl NetworkSubmitter for InMemoryLedger {
    async fn submit(&self, envelope: &TransactionEnvelope) -> SubmissionResult<()> {
        let hash = envelope.hash(&self.network_id);
        let mut state = self.state.lock();

        // Resubmitting a queued transaction is accepted and not queued twice
        if state.queue.iter().any(|(queued, _)| *queued == hash) {
            return Ok(());
        }

        let Some(current) = state.accounts.get(&envelope.source).copied() else {
            return Err(SubmissionError::failed("tx_no_account"));
        };

        let expected = state.next_sequence(&envelope.source, current);
        if envelope.sequence != expected {
            debug!(
                account = %envelope.source,
                sequence = envelope.sequence,
                expected,
                "Rejected envelope with bad sequence"
            );
            return Err(SubmissionError::BadSequence);
        }

        state.queue.push((hash, envelope.clone()));
        Ok(())
    }
}

#[async_trait]
impl ResultSource for InMemoryLedger {
    async fn result_by_hash(&self, hash: &TransactionHash) -> SubmissionResult<Option<TxResult>> {
        Ok(self.state.lock().results.get(hash).cloned())
    }

    async fn result_by_address_and_sequence(
        &self,
        address: &AccountAddress,
        sequence: u64,
    ) -> SubmissionResult<Option<TxResult>> {
        let state = self.state.lock();
        Ok(state
            .by_sequence
            .get(&(address.clone(), sequence))
            .and_then(|hash| state.results.get(hash))
            .cloned())
    }
}

#[async_trait]
impl SequenceProvider for InMemoryLedger {
    async fn current_sequence(&self, address: &AccountAddress) -> SubmissionResult<Option<u64>> {
        Ok(self.state.lock().accounts.get(address).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> InMemoryLedger {
        let ledger = InMemoryLedger::new(NetworkId::from_passphrase("test"));
        ledger.fund("GA", 10);
        ledger
    }

    fn envelope(sequence: u64) -> TransactionEnvelope {
        TransactionEnvelope::new("GA", sequence, format!("body-{sequence}").into_bytes(), "env")
    }

    #[tokio::test]
    async fn test_submit_requires_next_sequence() {
        let ledger = ledger();
        assert_eq!(ledger.submit(&envelope(12)).await, Err(SubmissionError::BadSequence));
        assert_eq!(ledger.submit(&envelope(10)).await, Err(SubmissionError::BadSequence));
        assert_eq!(ledger.submit(&envelope(11)).await, Ok(()));
        assert_eq!(ledger.submit(&envelope(12)).await, Ok(()));
        assert_eq!(ledger.queued(), 2);
    }

    #[tokio::test]
    async fn test_resubmit_queued_is_idempotent() {
        let ledger = ledger();
        ledger.submit(&envelope(11)).await.unwrap();
        ledger.submit(&envelope(11)).await.unwrap();
        assert_eq!(ledger.queued(), 1);
    }

    #[tokio::test]
    async fn test_unknown_account_rejected() {
        let ledger = ledger();
        let env = TransactionEnvelope::new("GNOBODY", 1, vec![1], "env");
        assert_eq!(
            ledger.submit(&env).await,
            Err(SubmissionError::failed("tx_no_account"))
        );
    }

    #[tokio::test]
    async fn test_close_ledger_applies_queue() {
        let ledger = ledger();
        let network = NetworkId::from_passphrase("test");
        let env = envelope(11);
        let hash = env.hash(&network);
        ledger.submit(&env).await.unwrap();

        let applied = ledger.close_ledger();
        assert_eq!(applied.len(), 1);
        assert!(applied[0].is_success());
        assert_eq!(ledger.ledger_sequence(), 1);

        let address = AccountAddress::from("GA");
        assert_eq!(ledger.current_sequence(&address).await, Ok(Some(11)));
        assert_eq!(ledger.result_by_hash(&hash).await.unwrap().unwrap().hash, hash);
        assert_eq!(
            ledger
                .result_by_address_and_sequence(&address, 11)
                .await
                .unwrap()
                .map(|r| r.hash),
            Some(hash)
        );
        // Now consumed
        assert_eq!(ledger.submit(&env).await, Err(SubmissionError::BadSequence));
    }
}
