//! Consumers on the far side of the audit and log channels.

use async_trait::async_trait;

use super::record::{AuditRecord, LogEntry};
use crate::errors::Result;

/// Tracing target every shipped log entry is emitted on
pub const LOG_SINK_TARGET: &str = "sshca::log_sink";

/// Durable destination for audit records
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: &AuditRecord) -> Result<()>;
}

/// Destination for diagnostic log entries
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn ship(&self, entry: &LogEntry) -> Result<()>;
}

/// Ships log entries as `tracing` events; the subscriber decides where they go.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

#[async_trait]
impl LogSink for TracingLogSink {
    async fn ship(&self, entry: &LogEntry) -> Result<()> {
        let fields = serde_json::to_string(entry.fields())
            .map_err(|e| crate::errors::Error::internal(format!("Failed to encode log entry: {}", e)))?;
        let message = entry.get("short_message").and_then(|v| v.as_str()).unwrap_or("");

        tracing::warn!(target: LOG_SINK_TARGET, fields = %fields, "{}", message);
        Ok(())
    }
}
