//! Repository implementations backed by SQLite.

pub mod audit_log;
pub mod certificate;

pub use audit_log::SqlxAuditLogRepository;
pub use certificate::{CertificateRecord, CertificateStore, NewCertificateRecord, SqlxCertificateRepository};
