//! # Domain Layer - Transaction Submission
//!
//! ## Components
//!
//! - `types`: TransactionHash, TransactionEnvelope, TxResult
//! - `registry`: OpenSubmissionRegistry (dedup of waiting callers)
//! - `sequence_gate`: SequenceGate (per-account ordering)
//! - `account_gates`: AccountGates (one gate per source account)
//! - `handle`: SubmissionHandle (caller-facing future)
//! - `config`: SubmissionConfig
//! - `errors`: SubmissionError enumeration

pub mod account_gates;
pub mod config;
pub mod errors;
pub mod handle;
pub mod registry;
pub mod sequence_gate;
pub mod types;

pub use account_gates::AccountGates;
pub use config::{ConfigError, SubmissionConfig};
pub use errors::{SubmissionError, SubmissionResult};
pub use handle::SubmissionHandle;
pub use registry::{listener, Listener, ListenerReceiver, OpenSubmissionRegistry, RegistryStats};
pub use sequence_gate::{
    GateReceiver, GateSender, GateSignal, GateUpdate, SequenceGate, DEFAULT_GATE_TIMEOUT,
};
pub use types::{
    AccountAddress, NetworkId, TransactionEnvelope, TransactionHash, TxResult, ENVELOPE_TYPE_TX,
};
