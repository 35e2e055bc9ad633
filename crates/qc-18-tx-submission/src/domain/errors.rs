//! Error types for the Transaction Submission subsystem.
//!
//! Errors travel by value: the same `SubmissionError` may be delivered to
//! every caller waiting on one transaction, so it is `Clone`.

use thiserror::Error;

/// Terminal failure of a submission attempt.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The transaction's sequence number has already been superseded.
    #[error("bad sequence: transaction sequence already consumed")]
    BadSequence,

    /// The submission was never resolved within its allotted window.
    #[error("timed out waiting for submission outcome")]
    Timeout,

    /// The network rejected the transaction for any other reason.
    #[error("submission failed: {reason}")]
    Failed { reason: String },

    /// The result source could not be queried.
    #[error("result source error: {reason}")]
    ResultSource { reason: String },

    /// The account sequence could not be loaded.
    #[error("sequence source error: {reason}")]
    SequenceSource { reason: String },
}

impl SubmissionError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_bad_sequence(&self) -> bool {
        matches!(self, Self::BadSequence)
    }

    /// Stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadSequence => "bad_sequence",
            Self::Timeout => "timeout",
            Self::Failed { .. } => "failed",
            Self::ResultSource { .. } => "result_source",
            Self::SequenceSource { .. } => "sequence_source",
        }
    }
}

/// Result type for submission operations
pub type SubmissionResult<T> = Result<T, SubmissionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SubmissionError::failed("tx_insufficient_fee");
        assert!(err.to_string().contains("tx_insufficient_fee"));
        assert!(SubmissionError::BadSequence.to_string().contains("bad sequence"));
    }

    #[test]
    fn test_bad_sequence_classification() {
        assert!(SubmissionError::BadSequence.is_bad_sequence());
        assert!(!SubmissionError::Timeout.is_bad_sequence());
        assert!(!SubmissionError::failed("busted").is_bad_sequence());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(SubmissionError::Timeout.kind(), "timeout");
        assert_eq!(
            SubmissionError::ResultSource {
                reason: "db down".into()
            }
            .kind(),
            "result_source"
        );
    }
}
