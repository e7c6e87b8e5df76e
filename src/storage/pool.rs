//! # Database Connection Pool Management
//!
//! SQLite connection pool creation for issued-certificate and audit storage.

use crate::config::DatabaseConfig;
use crate::errors::{Error, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{str::FromStr, time::Duration};

/// Type alias for the database connection pool
pub type DbPool = Pool<Sqlite>;

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a database connection pool with the specified configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    validate_config(config)?;

    let connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| Error::database(e, format!("Invalid SQLite connection string: {}", config.url)))?
        .create_if_missing(true)
        .busy_timeout(SQLITE_BUSY_TIMEOUT);

    // Every connection to ":memory:" opens its own database, so pin a single
    // connection for the lifetime of the pool.
    let (pool_options, connect_options) = if config.is_in_memory() {
        (
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None),
            connect_options,
        )
    } else {
        (
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections),
            connect_options.journal_mode(SqliteJournalMode::Wal),
        )
    };

    let pool = pool_options
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                url = %config.url,
                busy_timeout_ms = SQLITE_BUSY_TIMEOUT.as_millis(),
                "Failed to create SQLite database pool"
            );
            Error::database(e, format!("Failed to connect to database: {}", config.url))
        })?;

    tracing::info!(
        url = %config.url,
        in_memory = config.is_in_memory(),
        max_connections = config.max_connections,
        connect_timeout_ms = config.connect_timeout().as_millis(),
        "Database connection pool created"
    );

    if config.auto_migrate {
        tracing::info!("Auto-migration enabled, running database migrations");
        crate::storage::migrations::run_migrations(&pool).await?;
    }

    Ok(pool)
}

fn validate_config(config: &DatabaseConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(Error::config("max_connections must be greater than 0"));
    }

    if config.min_connections > config.max_connections {
        return Err(Error::config("min_connections cannot be greater than max_connections"));
    }

    if !config.url.starts_with("sqlite:") {
        return Err(Error::config("database URL must start with 'sqlite:'"));
    }

    Ok(())
}
