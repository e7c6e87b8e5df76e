//! Producer side of the audit and log channels.
//!
//! The two channels apply back-pressure differently. Audit records are handed to a
//! detached task, so a full audit channel stalls that task and never the response.
//! Log entries are sent in-line: a full log channel stalls the request that is
//! reporting the failure.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use super::record::{AuditRecord, LogEntry};

/// Receiving halves handed to the background workers
pub struct AuditReceivers {
    pub audit_rx: mpsc::Receiver<AuditRecord>,
    pub log_rx: mpsc::Receiver<LogEntry>,
}

/// Cloneable sender pair shared by every request
#[derive(Debug, Clone)]
pub struct AuditEmitter {
    audit_tx: mpsc::Sender<AuditRecord>,
    log_tx: mpsc::Sender<LogEntry>,
}

impl AuditEmitter {
    /// Create both bounded channels with the same capacity
    pub fn channel(capacity: usize) -> (Self, AuditReceivers) {
        let (audit_tx, audit_rx) = mpsc::channel(capacity);
        let (log_tx, log_rx) = mpsc::channel(capacity);

        (Self { audit_tx, log_tx }, AuditReceivers { audit_rx, log_rx })
    }

    /// Enqueue an audit record from a detached task; waits for capacity, never drops.
    pub fn emit_audit(&self, record: AuditRecord) -> JoinHandle<()> {
        let audit_tx = self.audit_tx.clone();

        tokio::spawn(async move {
            let uid = record.uid;
            if audit_tx.send(record).await.is_err() {
                warn!(audit_uid = %uid, "Audit channel closed; record not delivered");
            }
        })
    }

    /// Enqueue a log entry, waiting for capacity in the caller's task.
    pub async fn log(&self, entry: LogEntry) {
        if self.log_tx.send(entry).await.is_err() {
            warn!("Log channel closed; entry not delivered");
        }
    }
}
