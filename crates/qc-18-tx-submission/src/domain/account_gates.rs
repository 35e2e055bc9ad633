//! Per-account collection of sequence gates.
//!
//! Gates are created lazily on the first push for an account and pruned once
//! they drain. A pruned gate leaves its watermark behind, and the next gate
//! for that account starts from it. All gates share one lock; nothing under
//! it performs I/O.

use super::sequence_gate::{GateReceiver, GateUpdate, SequenceGate};
use super::types::AccountAddress;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

#[derive(Default)]
struct GateTable {
    gates: HashMap<AccountAddress, SequenceGate>,
    /// Watermarks of pruned gates
    watermarks: HashMap<AccountAddress, u64>,
}

pub struct AccountGates {
    table: Mutex<GateTable>,
    timeout: Duration,
}

impl AccountGates {
    pub fn new(timeout: Duration) -> Self {
        Self {
            table: Mutex::new(GateTable::default()),
            timeout,
        }
    }

    /// Queue a submission for `address` at `sequence`.
    ///
    /// The returned receiver fires only after a subsequent `update()` for
    /// the same account.
    pub fn push(&self, address: &AccountAddress, sequence: u64) -> GateReceiver {
        let (tx, rx) = oneshot::channel();
        let mut table = self.table.lock();
        let GateTable { gates, watermarks } = &mut *table;

        let gate = gates.entry(address.clone()).or_insert_with(|| {
            let next_sequence = watermarks.remove(address).unwrap_or(0);
            SequenceGate::resume(self.timeout, Instant::now(), next_sequence)
        });
        gate.push(tx, sequence);
        debug!(account = %address, sequence, queued = gate.size(), "Queued submission at sequence gate");
        rx
    }

    /// Report the latest sequence of `address`. No-op for accounts without
    /// a live gate.
    pub fn update(&self, address: &AccountAddress, current_sequence: u64) -> GateUpdate {
        let mut table = self.table.lock();
        let Some(gate) = table.gates.get_mut(address) else {
            return GateUpdate::default();
        };

        let update = gate.update(current_sequence);
        if update.timed_out > 0 {
            warn!(
                account = %address,
                timed_out = update.timed_out,
                "Sequence gate flushed after inactivity"
            );
        } else if update.resolved() > 0 {
            debug!(
                account = %address,
                next_sequence = gate.next_sequence(),
                released = update.released,
                rejected = update.rejected,
                "Sequence gate advanced"
            );
        }
        update
    }

    /// Time out an idle gate without moving its watermark. Used when the
    /// account's sequence cannot be loaded.
    pub fn expire_idle(&self, address: &AccountAddress) -> usize {
        let mut table = self.table.lock();
        let Some(gate) = table.gates.get_mut(address) else {
            return 0;
        };

        let flushed = gate.expire_idle(Instant::now());
        if flushed > 0 {
            warn!(account = %address, timed_out = flushed, "Sequence gate flushed after inactivity");
        }
        flushed
    }

    /// Accounts that currently own a gate
    pub fn accounts(&self) -> Vec<AccountAddress> {
        self.table.lock().gates.keys().cloned().collect()
    }

    /// Drop gates with nothing queued, remembering their watermarks.
    /// Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut table = self.table.lock();
        let GateTable { gates, watermarks } = &mut *table;

        let before = gates.len();
        gates.retain(|address, gate| {
            if gate.is_empty() {
                watermarks.insert(address.clone(), gate.next_sequence());
                false
            } else {
                true
            }
        });
        before - gates.len()
    }

    /// Next sequence `address` will accept, from its live gate or the
    /// watermark its last gate left behind
    pub fn next_sequence(&self, address: &AccountAddress) -> Option<u64> {
        let table = self.table.lock();
        table
            .gates
            .get(address)
            .map(SequenceGate::next_sequence)
            .or_else(|| table.watermarks.get(address).copied())
    }

    /// Queued submissions for `address`
    pub fn queued(&self, address: &AccountAddress) -> usize {
        self.table
            .lock()
            .gates
            .get(address)
            .map(SequenceGate::size)
            .unwrap_or(0)
    }

    /// Queued submissions across all accounts
    pub fn total_queued(&self) -> usize {
        self.table.lock().gates.values().map(SequenceGate::size).sum()
    }

    pub fn len(&self) -> usize {
        self.table.lock().gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().gates.is_empty()
    }
}
