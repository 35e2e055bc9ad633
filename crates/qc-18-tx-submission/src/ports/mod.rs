//! Ports layer for the Transaction Submission subsystem.
//!
//! - Inbound (Driving) ports: API exposed to the gateway
//! - Outbound (Driven) ports: network, ledger results, account sequences

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
