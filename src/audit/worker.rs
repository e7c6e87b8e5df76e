//! Background consumers for the audit and log channels.
//!
//! One task drains each channel. Workers stop when every sender is gone or when
//! [`WorkerHandle::shutdown`] is called. On shutdown they keep receiving until the
//! channel stays empty for [`SHUTDOWN_GRACE`], so records from emit tasks still
//! waiting on a full channel are stored too.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use super::emitter::AuditReceivers;
use super::record::{AuditRecord, LogEntry};
use super::sink::{AuditSink, LogSink};

/// How long a shutting-down worker waits for the next queued item
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Handle for stopping the background consumers
pub struct WorkerHandle {
    shutdown_tx: watch::Sender<bool>,
    worker_handles: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Signal both workers to drain their queues and stop
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown of audit workers");
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for both workers to finish
    pub async fn join(self) {
        for handle in self.worker_handles {
            let _ = handle.await;
        }
    }
}

/// Start the audit and log consumers
pub fn spawn_workers(
    receivers: AuditReceivers,
    audit_sink: Arc<dyn AuditSink>,
    log_sink: Arc<dyn LogSink>,
) -> WorkerHandle {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let AuditReceivers { audit_rx, log_rx } = receivers;

    let audit_worker = tokio::spawn(run_audit_worker(audit_rx, audit_sink, shutdown_rx.clone()));
    let log_worker = tokio::spawn(run_log_worker(log_rx, log_sink, shutdown_rx));

    info!("Audit and log workers started");

    WorkerHandle { shutdown_tx, worker_handles: vec![audit_worker, log_worker] }
}

async fn run_audit_worker(
    mut rx: mpsc::Receiver<AuditRecord>,
    sink: Arc<dyn AuditSink>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            record = rx.recv() => match record {
                Some(record) => store_audit(sink.as_ref(), &record).await,
                None => break,
            },
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    let mut drained = 0;
                    while let Ok(Some(record)) = tokio::time::timeout(SHUTDOWN_GRACE, rx.recv()).await {
                        store_audit(sink.as_ref(), &record).await;
                        drained += 1;
                    }
                    info!(drained_records = drained, "Audit worker shutdown complete");
                    return;
                }
            }
        }
    }

    info!("Audit channel closed; audit worker stopped");
}

async fn store_audit(sink: &dyn AuditSink, record: &AuditRecord) {
    if let Err(e) = sink.record(record).await {
        error!(
            error = %e,
            audit_uid = %record.uid,
            target_uid = %record.target_uid,
            "Failed to store audit record"
        );
    }
}

async fn run_log_worker(
    mut rx: mpsc::Receiver<LogEntry>,
    sink: Arc<dyn LogSink>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            entry = rx.recv() => match entry {
                Some(entry) => ship_log(sink.as_ref(), &entry).await,
                None => break,
            },
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    let mut drained = 0;
                    while let Ok(Some(entry)) = tokio::time::timeout(SHUTDOWN_GRACE, rx.recv()).await {
                        ship_log(sink.as_ref(), &entry).await;
                        drained += 1;
                    }
                    info!(drained_entries = drained, "Log worker shutdown complete");
                    return;
                }
            }
        }
    }

    info!("Log channel closed; log worker stopped");
}

async fn ship_log(sink: &dyn LogSink, entry: &LogEntry) {
    if let Err(e) = sink.ship(entry).await {
        warn!(error = %e, "Failed to ship log entry");
    }
}
