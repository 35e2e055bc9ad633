//! Background reconciliation driver.
//!
//! Calls `tick()` on a fixed interval until shut down. Missed ticks are
//! skipped rather than replayed in a burst.

use crate::ports::inbound::TransactionSubmissionApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Handle to a running reconciler task
pub struct ReconcilerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Stop the reconciler and wait for the in-flight pass to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the periodic reconciliation loop on the current runtime.
pub fn spawn_reconciler<S>(system: Arc<S>, interval: Duration) -> ReconcilerHandle
where
    S: TransactionSubmissionApi + 'static,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let task = tokio::spawn(run_reconciliation(system, interval, shutdown_rx));

    ReconcilerHandle {
        shutdown_tx: Some(shutdown_tx),
        task,
    }
}

async fn run_reconciliation<S>(
    system: Arc<S>,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    S: TransactionSubmissionApi + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_ms = interval.as_millis() as u64, "Reconciler started");

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                info!("Reconciler shutting down");
                break;
            }
            _ = ticker.tick() => {
                let report = system.tick().await;
                if report.finished > 0 || report.cleaned > 0 {
                    debug!(
                        finished = report.finished,
                        cleaned = report.cleaned,
                        pending = report.pending,
                        "Reconciler tick"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SubmissionConfig, TransactionEnvelope, TxResult};
    use crate::ports::outbound::{MockResultSource, MockSequenceProvider, MockSubmitter};
    use crate::service::SubmissionSystem;

    fn system(results: Arc<MockResultSource>) -> Arc<SubmissionSystem> {
        let config = SubmissionConfig {
            sequence_gating: false,
            ..SubmissionConfig::default()
        };
        Arc::new(
            SubmissionSystem::new(
                config,
                Arc::new(MockSubmitter::new()),
                results,
                Arc::new(MockSequenceProvider::new()),
            )
            .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconciler_delivers_results() {
        let results = Arc::new(MockResultSource::new());
        let sys = system(results.clone());

        let envelope = TransactionEnvelope::new("GA", 1, b"body".to_vec(), "env");
        let handle = sys.submit(envelope).await;
        results.insert(TxResult {
            hash: handle.hash(),
            ledger_sequence: 3,
            envelope: "env".into(),
            result_payload: "ok".into(),
            error: None,
        });

        let reconciler = spawn_reconciler(sys.clone(), Duration::from_secs(1));
        assert_eq!(handle.await.unwrap().ledger_sequence, 3);
        assert!(sys.pending().is_empty());

        reconciler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_task() {
        let sys = system(Arc::new(MockResultSource::new()));
        let reconciler = spawn_reconciler(sys, Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(!reconciler.is_finished());
        reconciler.shutdown().await;
    }
}
