//! Records carried on the audit and log channels.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Operation kind recorded for certificate issuance
pub const CERT_CREATE: &str = "cert.create";

/// One completed issuance, written after the certificate was persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub uid: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub kind: String,
    /// UID of the issued certificate
    pub target_uid: Uuid,
    /// Storage id of the issued certificate
    pub target_id: i64,
}

impl AuditRecord {
    pub fn certificate_created(
        target_uid: Uuid,
        target_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: Uuid::new_v4(),
            start_time,
            end_time,
            kind: CERT_CREATE.to_string(),
            target_uid,
            target_id,
        }
    }
}

/// Structured diagnostic entry; field names follow the GELF convention
/// (`short_message`, underscore-prefixed additional fields).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogEntry(BTreeMap<String, Value>);

impl LogEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.0
    }
}
