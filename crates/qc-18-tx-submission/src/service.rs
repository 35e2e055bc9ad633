//! Submission orchestrator.
//!
//! `SubmissionSystem` ties the registry, the per-account sequence gates and
//! the three outbound ports together. `submit()` returns a handle per call;
//! `tick()` is the periodic reconciliation pass that resolves those handles.

use crate::domain::{
    listener, AccountGates, ConfigError, NetworkId, OpenSubmissionRegistry, SubmissionConfig,
    SubmissionError, SubmissionHandle, SubmissionResult, TransactionEnvelope, TransactionHash,
    TxResult,
};
use crate::metrics;
use crate::ports::inbound::TransactionSubmissionApi;
use crate::ports::outbound::{NetworkSubmitter, ResultSource, SequenceProvider};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Hashes resolved with a ledger result
    pub finished: usize,
    /// Hashes dropped for exceeding the max age
    pub cleaned: usize,
    /// Hashes still waiting after the pass
    pub pending: usize,
    /// Submissions still held at sequence gates
    pub gated: usize,
}

/// Deduplicating transaction submitter
pub struct SubmissionSystem {
    config: SubmissionConfig,
    network_id: NetworkId,
    registry: OpenSubmissionRegistry,
    gates: AccountGates,
    submitter: Arc<dyn NetworkSubmitter>,
    results: Arc<dyn ResultSource>,
    sequences: Arc<dyn SequenceProvider>,
}

impl SubmissionSystem {
    pub fn new(
        config: SubmissionConfig,
        submitter: Arc<dyn NetworkSubmitter>,
        results: Arc<dyn ResultSource>,
        sequences: Arc<dyn SequenceProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let network_id = config.network_id();
        let gates = AccountGates::new(config.gate_timeout);

        info!(
            passphrase = %config.network_passphrase,
            sequence_gating = config.sequence_gating,
            max_submission_age_ms = config.max_submission_age.as_millis() as u64,
            "Submission system initialized"
        );

        Ok(Self {
            config,
            network_id,
            registry: OpenSubmissionRegistry::new(),
            gates,
            submitter,
            results,
            sequences,
        })
    }

    /// Submit an envelope. The handle resolves to exactly one outcome.
    ///
    /// Already-applied transactions resolve immediately without touching
    /// the network. Accepted envelopes resolve on a later `tick()`. A gated
    /// envelope holds this call at its account gate, up to `gate_timeout`,
    /// before it is forwarded.
    pub async fn submit(&self, envelope: TransactionEnvelope) -> SubmissionHandle {
        let hash = self.hash_of(&envelope);

        match self.results.result_by_hash(&hash).await {
            Ok(Some(result)) => {
                debug!(tx_hash = %hash, "Transaction already applied");
                metrics::record_submission("already_applied");
                return SubmissionHandle::ready(hash, Ok(result));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(tx_hash = %hash, error = %e, "Result lookup failed");
                metrics::record_submission(e.kind());
                return SubmissionHandle::ready(hash, Err(e));
            }
        }

        if self.config.sequence_gating {
            match self.wait_for_turn(&envelope).await {
                Ok(()) => {}
                Err(SubmissionError::BadSequence) => {
                    let outcome = self.recheck_bad_sequence(&envelope, hash).await;
                    return self.resolved(hash, outcome);
                }
                Err(e) => return self.resolved(hash, Err(e)),
            }
        }

        let started = Instant::now();
        let outcome = self.submitter.submit(&envelope).await;
        metrics::record_network_submit(started.elapsed().as_secs_f64());

        match outcome {
            Ok(()) => {
                let (tx, rx) = listener();
                self.registry.add(hash, tx);
                metrics::record_submission("pending");
                metrics::set_open_submissions(self.registry.len());
                debug!(tx_hash = %hash, source = %envelope.source, sequence = envelope.sequence, "Submission accepted");
                SubmissionHandle::new(hash, rx)
            }
            Err(SubmissionError::BadSequence) => {
                let outcome = self.recheck_bad_sequence(&envelope, hash).await;
                self.resolved(hash, outcome)
            }
            Err(e) => {
                warn!(tx_hash = %hash, error = %e, "Network rejected submission");
                self.resolved(hash, Err(e))
            }
        }
    }

    /// One reconciliation pass: deliver results, advance gates, drop
    /// expired submissions.
    pub async fn tick(&self) -> TickReport {
        let mut report = TickReport::default();

        // No lock is held across the lookups; hashes finished concurrently
        // are simply no-ops in `finish()`.
        for hash in self.registry.pending() {
            match self.results.result_by_hash(&hash).await {
                Ok(Some(result)) => {
                    let delivered = self.registry.finish(&result);
                    metrics::record_results_delivered(delivered as u64);
                    report.finished += 1;
                }
                Ok(None) => {}
                Err(e) => warn!(tx_hash = %hash, error = %e, "Result lookup failed during tick"),
            }
        }

        for account in self.gates.accounts() {
            match self.sequences.current_sequence(&account).await {
                Ok(Some(current)) => {
                    self.gates.update(&account, current);
                }
                Ok(None) => {
                    self.gates.expire_idle(&account);
                }
                Err(e) => {
                    warn!(account = %account, error = %e, "Sequence lookup failed during tick");
                    self.gates.expire_idle(&account);
                }
            }
        }
        self.gates.prune();

        report.cleaned = self.registry.clean(self.config.max_submission_age);
        metrics::record_submissions_cleaned(report.cleaned as u64);

        report.pending = self.registry.len();
        report.gated = self.gates.total_queued();
        metrics::set_open_submissions(report.pending);
        metrics::set_gate_queued(report.gated);

        if report.finished > 0 || report.cleaned > 0 {
            debug!(
                finished = report.finished,
                cleaned = report.cleaned,
                pending = report.pending,
                gated = report.gated,
                "Reconciliation pass complete"
            );
        }

        report
    }

    /// Hashes currently awaiting a ledger result
    pub fn pending(&self) -> Vec<TransactionHash> {
        self.registry.pending()
    }

    /// Network-bound hash of `envelope`
    pub fn hash_of(&self, envelope: &TransactionEnvelope) -> TransactionHash {
        envelope.hash(&self.network_id)
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    pub fn registry(&self) -> &OpenSubmissionRegistry {
        &self.registry
    }

    pub fn gates(&self) -> &AccountGates {
        &self.gates
    }

    /// Hold the caller at the account's gate until its sequence is next.
    ///
    /// Unknown accounts bypass the gate.
    async fn wait_for_turn(&self, envelope: &TransactionEnvelope) -> SubmissionResult<()> {
        let current = match self.sequences.current_sequence(&envelope.source).await? {
            Some(current) => current,
            None => {
                debug!(source = %envelope.source, "Unknown account, bypassing sequence gate");
                return Ok(());
            }
        };

        let rx = self.gates.push(&envelope.source, envelope.sequence);
        self.gates.update(&envelope.source, current);
        metrics::set_gate_queued(self.gates.total_queued());

        rx.await.unwrap_or(Err(SubmissionError::Timeout))
    }

    /// A bad sequence may mean this very transaction was already applied by
    /// a concurrent submitter. Checked once; a result landing after the
    /// check is reported as `BadSequence`.
    async fn recheck_bad_sequence(
        &self,
        envelope: &TransactionEnvelope,
        hash: TransactionHash,
    ) -> SubmissionResult<TxResult> {
        match self
            .results
            .result_by_address_and_sequence(&envelope.source, envelope.sequence)
            .await?
        {
            Some(result) if result.hash == hash => {
                debug!(tx_hash = %hash, "Bad sequence resolved: transaction already applied");
                Ok(result)
            }
            _ => Err(SubmissionError::BadSequence),
        }
    }

    fn resolved(
        &self,
        hash: TransactionHash,
        outcome: SubmissionResult<TxResult>,
    ) -> SubmissionHandle {
        match &outcome {
            Ok(_) => metrics::record_submission("already_applied"),
            Err(e) => metrics::record_submission(e.kind()),
        }
        SubmissionHandle::ready(hash, outcome)
    }
}

#[async_trait]
impl TransactionSubmissionApi for SubmissionSystem {
    async fn submit(&self, envelope: TransactionEnvelope) -> SubmissionHandle {
        SubmissionSystem::submit(self, envelope).await
    }

    fn pending(&self) -> Vec<TransactionHash> {
        SubmissionSystem::pending(self)
    }

    async fn tick(&self) -> TickReport {
        SubmissionSystem::tick(self).await
    }
}
