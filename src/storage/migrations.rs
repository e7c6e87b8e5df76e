//! # Database Migration Management
//!
//! Schema migrations are compiled into the binary and applied in version order.
//! Applied versions are tracked in `schema_migrations`, so running the migrations
//! again is a no-op.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A schema migration that has been applied
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
    pub installed_on: String,
}

struct Migration {
    version: i64,
    description: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create certificates",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS certificates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uid TEXT NOT NULL UNIQUE,
                key_id TEXT NOT NULL,
                remote_user TEXT NOT NULL,
                remote_host TEXT NOT NULL,
                user_ip TEXT NOT NULL,
                command TEXT NOT NULL,
                public_key TEXT NOT NULL,
                user_fingerprint TEXT NOT NULL,
                ca_fingerprint TEXT NOT NULL,
                certificate TEXT NOT NULL,
                valid_after TEXT NOT NULL,
                valid_before TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_certificates_user_fingerprint ON certificates (user_fingerprint)",
            "CREATE INDEX IF NOT EXISTS idx_certificates_remote_user ON certificates (remote_user)",
        ],
    },
    Migration {
        version: 2,
        description: "create audit_log",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uid TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                target_uid TEXT NOT NULL,
                target_id INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_audit_log_target_uid ON audit_log (target_uid)",
        ],
    },
];

/// Apply every migration not yet recorded in `schema_migrations`
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            installed_on TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::database(e, "Failed to create schema_migrations table"))?;

    let current = get_migration_version(pool).await?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| Error::database(e, "Failed to begin migration transaction"))?;

        for statement in migration.statements {
            sqlx::query(*statement).execute(&mut *tx).await.map_err(|e| {
                tracing::error!(error = %e, version = migration.version, "Migration failed");
                Error::database(e, format!("Migration {} failed", migration.version))
            })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, description, installed_on) VALUES ($1, $2, $3)")
            .bind(migration.version)
            .bind(migration.description)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::database(e, "Failed to record migration"))?;

        tx.commit()
            .await
            .map_err(|e| Error::database(e, format!("Failed to commit migration {}", migration.version)))?;

        info!(version = migration.version, description = migration.description, "Applied migration");
    }

    Ok(())
}

/// Highest applied migration version, 0 when none
pub async fn get_migration_version(pool: &DbPool) -> Result<i64> {
    sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(version) FROM schema_migrations")
        .fetch_one(pool)
        .await
        .map(|version| version.unwrap_or(0))
        .map_err(|e| Error::database(e, "Failed to read migration version"))
}

/// Applied migrations in version order
pub async fn list_applied_migrations(pool: &DbPool) -> Result<Vec<MigrationInfo>> {
    sqlx::query_as::<_, MigrationInfo>(
        "SELECT version, description, installed_on FROM schema_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::database(e, "Failed to list migrations"))
}
