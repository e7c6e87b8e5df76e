//! # Storage and Persistence
//!
//! SQLite persistence for issued certificates and the audit trail.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::{get_migration_version, list_applied_migrations, run_migrations, MigrationInfo};
pub use pool::{create_pool, DbPool};
pub use repositories::{
    CertificateRecord, CertificateStore, NewCertificateRecord, SqlxAuditLogRepository,
    SqlxCertificateRepository,
};

use crate::errors::{Error, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| Error::database(e, "Database connectivity check failed"))?;

    Ok(())
}
