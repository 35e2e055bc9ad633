//! # Transaction Submission Subsystem
//!
//! **Subsystem ID:** 18
//!
//! ## Purpose
//!
//! Accepts signed transaction envelopes, forwards them to the network and
//! hands every caller exactly one terminal outcome once the transaction is
//! seen on the ledger. Concurrent submitters of the same transaction share
//! one open submission and are all notified by a single result.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One open submission per hash | `domain/registry.rs` - `add()` appends listeners |
//! | Each listener receives at most one message | `domain/registry.rs` - `finish()` removes the entry before sending |
//! | Expired submissions are never delivered success | `domain/registry.rs` - `clean()` drops listeners unsent |
//! | Gate watermark never decreases | `domain/sequence_gate.rs` - `update_at()` takes the max |
//! | Gate entries resolved at most once | `domain/sequence_gate.rs` - entries are popped before signalling |
//! | No lock held across port calls | `service.rs` - lookups iterate a snapshot |
//!
//! ## Submission Flow
//!
//! ```text
//! submit(envelope)
//!     │
//!     ├── result_by_hash ── found ──────────────────→ [APPLIED]
//!     │
//!     ├── sequence gate ── stale ──→ recheck ──────→ [APPLIED] / [BAD_SEQ]
//!     │        │
//!     │        └── idle too long ──────────────────→ [TIMEOUT]
//!     │
//!     └── network submit ── bad seq ──→ recheck ───→ [APPLIED] / [BAD_SEQ]
//!              │
//!              ├── error ──────────────────────────→ [FAILED]
//!              │
//!              └── accepted ──→ [OPEN] ──tick──────→ [APPLIED]
//!                                  │
//!                                  └── max age ────→ [TIMEOUT]
//! ```
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `NetworkSubmitter` | Forward envelopes to the network |
//! | `ResultSource` | Ledger results by hash or by account and sequence |
//! | `SequenceProvider` | Current account sequence for gating |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/memory.rs - InMemoryLedger (all outbound ports)       │
//! │  reconciler.rs      - periodic tick driver                      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - TransactionSubmissionApi trait             │
//! │  ports/outbound.rs - NetworkSubmitter, ResultSource,            │
//! │                      SequenceProvider traits                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/registry.rs      - OpenSubmissionRegistry               │
//! │  domain/sequence_gate.rs - SequenceGate (min-heap by sequence)  │
//! │  domain/account_gates.rs - AccountGates                         │
//! │  domain/handle.rs        - SubmissionHandle                     │
//! │  domain/types.rs         - TransactionHash, TxResult            │
//! │  domain/errors.rs        - SubmissionError enum                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use qc_18_tx_submission::{spawn_reconciler, InMemoryLedger, SubmissionConfig, SubmissionSystem};
//!
//! let config = SubmissionConfig::default();
//! let ledger = Arc::new(InMemoryLedger::new(config.network_id()));
//! let system = Arc::new(SubmissionSystem::new(config, ledger.clone(), ledger.clone(), ledger)?);
//! let reconciler = spawn_reconciler(system.clone(), Duration::from_secs(1));
//!
//! let outcome = system.submit(envelope).await.await;
//! reconciler.shutdown().await;
//! ```

#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod reconciler;
pub mod service;

pub use adapters::InMemoryLedger;
pub use domain::*;
pub use ports::inbound::TransactionSubmissionApi;
pub use ports::outbound::{NetworkSubmitter, ResultSource, SequenceProvider};
pub use reconciler::{spawn_reconciler, ReconcilerHandle};
pub use service::{SubmissionSystem, TickReport};
