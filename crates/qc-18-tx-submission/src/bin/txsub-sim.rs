//! # Transaction Submission Simulator
//!
//! Drives a `SubmissionSystem` against the in-memory ledger: a handful of
//! accounts submit envelopes out of order, with duplicates and one stale
//! sequence, while a background task closes ledgers.
//!
//! Configuration comes from `QC_TXSUB_*` environment variables. Set
//! `QC_TXSUB_JSON_LOGS=true` for JSON output and `RUST_LOG` to filter.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qc_18_tx_submission::{
    spawn_reconciler, InMemoryLedger, SubmissionConfig, SubmissionError, SubmissionSystem,
    TransactionEnvelope,
};

const ACCOUNTS: [&str; 3] = ["GALICE", "GBOB", "GCAROL"];
const TXS_PER_ACCOUNT: u64 = 4;

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,qc_18_tx_submission=debug"))
        .context("invalid log filter")?;

    let json = std::env::var("QC_TXSUB_JSON_LOGS")
        .map(|v| v == "true")
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
            .context("failed to install subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .context("failed to install subscriber")?;
    }
    Ok(())
}

/// Envelopes for every account, highest sequence first, each sent twice,
/// plus one already-consumed sequence.
fn workload() -> Vec<TransactionEnvelope> {
    let mut envelopes = Vec::new();
    for account in ACCOUNTS {
        for sequence in (1..=TXS_PER_ACCOUNT).rev() {
            let body = format!("{account}:payment:{sequence}").into_bytes();
            let envelope =
                TransactionEnvelope::new(account, sequence, body, format!("{account}/{sequence}"));
            envelopes.push(envelope.clone());
            envelopes.push(envelope);
        }
        envelopes.push(TransactionEnvelope::new(
            account,
            0,
            format!("{account}:stale").into_bytes(),
            format!("{account}/0"),
        ));
    }
    envelopes
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config = SubmissionConfig::from_env().context("invalid submission config")?;
    info!(?config, "Starting transaction submission simulator");

    let ledger = Arc::new(InMemoryLedger::new(config.network_id()));
    for account in ACCOUNTS {
        ledger.fund(account, 0);
    }

    let close_every = config.reconcile_interval * 2;
    let system = Arc::new(SubmissionSystem::new(
        config.clone(),
        ledger.clone(),
        ledger.clone(),
        ledger.clone(),
    )?);
    let reconciler = spawn_reconciler(system.clone(), config.reconcile_interval);

    let closer = {
        let ledger = ledger.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(close_every);
            loop {
                ticker.tick().await;
                ledger.close_ledger();
            }
        })
    };

    let mut submissions = JoinSet::new();
    for envelope in workload() {
        let system = system.clone();
        submissions.spawn(async move {
            let label = format!("{}#{}", envelope.source, envelope.sequence);
            let handle = system.submit(envelope).await;
            (label, handle.hash(), handle.await)
        });
    }

    let (mut applied, mut bad_sequence, mut other) = (0usize, 0usize, 0usize);
    let collect = async {
        while let Some(joined) = submissions.join_next().await {
            let (label, hash, outcome) = joined.context("submission task panicked")?;
            match outcome {
                Ok(result) => {
                    applied += 1;
                    info!(tx = %label, tx_hash = %hash, ledger = result.ledger_sequence, "Applied");
                }
                Err(SubmissionError::BadSequence) => {
                    bad_sequence += 1;
                    info!(tx = %label, tx_hash = %hash, "Rejected: bad sequence");
                }
                Err(e) => {
                    other += 1;
                    warn!(tx = %label, tx_hash = %hash, error = %e, "Submission failed");
                }
            }
        }
        anyhow::Ok(())
    };

    tokio::select! {
        res = collect => res?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    closer.abort();
    reconciler.shutdown().await;

    info!(
        applied,
        bad_sequence,
        other,
        ledger = ledger.ledger_sequence(),
        "Simulation complete"
    );
    Ok(())
}
