//! # Transaction Submission Metrics
//!
//! Prometheus metrics for submission throughput and reconciliation health.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-tx-submission = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `txsub_submissions_total` - Counter of submission attempts (by outcome)
//! - `txsub_network_submit_seconds` - Histogram of network submitter latency
//! - `txsub_results_delivered_total` - Counter of results handed to listeners
//! - `txsub_submissions_cleaned_total` - Counter of expired open submissions
//! - `txsub_open_submissions` - Gauge of hashes awaiting a ledger result
//! - `txsub_gate_queued` - Gauge of submissions waiting at sequence gates

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec, Gauge,
    Histogram, IntCounter, IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Submission attempts, labeled by outcome
    pub static ref SUBMISSIONS: IntCounterVec = register_int_counter_vec!(
        "txsub_submissions_total",
        "Total number of submission attempts by outcome",
        &["outcome"]
    )
    .expect("Failed to create SUBMISSIONS metric");

    /// Network submitter latency
    pub static ref NETWORK_SUBMIT_SECONDS: Histogram = register_histogram!(
        "txsub_network_submit_seconds",
        "Latency of forwarding an envelope to the network"
    )
    .expect("Failed to create NETWORK_SUBMIT_SECONDS metric");

    /// Results delivered to waiting listeners
    pub static ref RESULTS_DELIVERED: IntCounter = register_int_counter!(
        "txsub_results_delivered_total",
        "Total number of results delivered to waiting listeners"
    )
    .expect("Failed to create RESULTS_DELIVERED metric");

    /// Open submissions dropped for age
    pub static ref SUBMISSIONS_CLEANED: IntCounter = register_int_counter!(
        "txsub_submissions_cleaned_total",
        "Total number of open submissions dropped after exceeding max age"
    )
    .expect("Failed to create SUBMISSIONS_CLEANED metric");

    /// Hashes awaiting a ledger result
    pub static ref OPEN_SUBMISSIONS: Gauge = register_gauge!(
        "txsub_open_submissions",
        "Number of transaction hashes awaiting a ledger result"
    )
    .expect("Failed to create OPEN_SUBMISSIONS metric");

    /// Submissions waiting at sequence gates
    pub static ref GATE_QUEUED: Gauge = register_gauge!(
        "txsub_gate_queued",
        "Number of submissions waiting at per-account sequence gates"
    )
    .expect("Failed to create GATE_QUEUED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a submission attempt with its outcome label
#[cfg(feature = "metrics")]
pub fn record_submission(outcome: &str) {
    SUBMISSIONS.with_label_values(&[outcome]).inc();
}

/// Record network submitter latency
#[cfg(feature = "metrics")]
pub fn record_network_submit(seconds: f64) {
    NETWORK_SUBMIT_SECONDS.observe(seconds);
}

/// Record results delivered by a reconciliation pass
#[cfg(feature = "metrics")]
pub fn record_results_delivered(count: u64) {
    RESULTS_DELIVERED.inc_by(count);
}

/// Record open submissions dropped for age
#[cfg(feature = "metrics")]
pub fn record_submissions_cleaned(count: u64) {
    SUBMISSIONS_CLEANED.inc_by(count);
}

/// Update open submissions gauge
#[cfg(feature = "metrics")]
pub fn set_open_submissions(count: usize) {
    OPEN_SUBMISSIONS.set(count as f64);
}

/// Update gate queue gauge
#[cfg(feature = "metrics")]
pub fn set_gate_queued(count: usize) {
    GATE_QUEUED.set(count as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_submission(_outcome: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_network_submit(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_results_delivered(_count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_submissions_cleaned(_count: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_open_submissions(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_gate_queued(_count: usize) {}
