//! Asynchronous audit trail and failure-diagnostic logging.
//!
//! Issuance hands [`AuditRecord`]s and [`LogEntry`]s to an [`AuditEmitter`]; two
//! background workers drain the bounded channels into an [`AuditSink`] and a
//! [`LogSink`].

pub mod emitter;
pub mod record;
pub mod sink;
pub mod worker;

pub use emitter::{AuditEmitter, AuditReceivers};
pub use record::{AuditRecord, LogEntry, CERT_CREATE};
pub use sink::{AuditSink, LogSink, TracingLogSink, LOG_SINK_TARGET};
pub use worker::{spawn_workers, WorkerHandle};
