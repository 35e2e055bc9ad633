//! # Inbound Port - TransactionSubmissionApi
//!
//! Primary driving port used by the API layer and the reconciliation driver.

use crate::domain::{SubmissionHandle, TransactionEnvelope, TransactionHash};
use crate::service::TickReport;
use async_trait::async_trait;

/// Primary API for the Transaction Submission subsystem.
///
/// # Example
///
/// ```rust,ignore
/// use qc_18_tx_submission::ports::TransactionSubmissionApi;
///
/// async fn example(txsub: &impl TransactionSubmissionApi, envelope: TransactionEnvelope) {
///     let handle = txsub.submit(envelope).await;
///     match handle.await {
///         Ok(result) => println!("applied in ledger {}", result.ledger_sequence),
///         Err(e) => println!("submission failed: {e}"),
///     }
/// }
/// ```
#[async_trait]
pub trait TransactionSubmissionApi: Send + Sync {
    /// Submits an envelope.
    ///
    /// Every failure is delivered through the returned handle. Already-applied
    /// transactions resolve immediately without touching the network.
    ///
    /// With sequence gating enabled the call itself does not return until the
    /// envelope's sequence comes up at its account gate (or the gate rejects
    /// or times it out), which can take up to the configured gate timeout.
    /// Only after that is the envelope forwarded and the handle returned.
    async fn submit(&self, envelope: TransactionEnvelope) -> SubmissionHandle;

    /// Hashes still waiting for a ledger result.
    fn pending(&self) -> Vec<TransactionHash>;

    /// Runs one reconciliation pass.
    ///
    /// Should be called periodically (e.g., every second).
    async fn tick(&self) -> TickReport;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn TransactionSubmissionApi) {}
}
