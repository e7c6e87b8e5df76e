//! Issued certificate repository.
//!
//! Every successful issuance is stored with its derived fields so operators can
//! look certificates up by UID, principal, or the MD5 fingerprint `ssh-keygen`
//! prints for the user's key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::storage::DbPool;

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::internal(format!("Invalid timestamp '{}': {}", s, e)))
}

// ============================================================================
// Data Types
// ============================================================================

/// Certificate issuance to be stored
///
/// `uid` is the request identifier. It equals the certificate nonce only for locally
/// signed certificates; the remote engine picks its own nonce. `key_id` and the
/// validity window are read from the signed certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCertificateRecord {
    pub uid: Uuid,
    pub key_id: String,
    pub remote_user: String,
    pub remote_host: String,
    pub user_ip: String,
    pub command: String,
    /// Caller key in authorized-key form
    pub public_key: String,
    pub user_fingerprint: String,
    pub ca_fingerprint: String,
    /// Signed certificate text
    pub certificate: String,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
}

/// Certificate issuance as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: i64,
    pub uid: Uuid,
    pub key_id: String,
    pub remote_user: String,
    pub remote_host: String,
    pub user_ip: String,
    pub command: String,
    pub public_key: String,
    pub user_fingerprint: String,
    pub ca_fingerprint: String,
    pub certificate: String,
    pub valid_after: DateTime<Utc>,
    pub valid_before: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct CertificateRow {
    id: i64,
    uid: String,
    key_id: String,
    remote_user: String,
    remote_host: String,
    user_ip: String,
    command: String,
    public_key: String,
    user_fingerprint: String,
    ca_fingerprint: String,
    certificate: String,
    valid_after: String,
    valid_before: String,
    created_at: String,
}

impl TryFrom<CertificateRow> for CertificateRecord {
    type Error = Error;

    fn try_from(row: CertificateRow) -> Result<Self> {
        Ok(CertificateRecord {
            id: row.id,
            uid: Uuid::parse_str(&row.uid)
                .map_err(|e| Error::internal(format!("Invalid certificate uid '{}': {}", row.uid, e)))?,
            key_id: row.key_id,
            remote_user: row.remote_user,
            remote_host: row.remote_host,
            user_ip: row.user_ip,
            command: row.command,
            public_key: row.public_key,
            user_fingerprint: row.user_fingerprint,
            ca_fingerprint: row.ca_fingerprint,
            certificate: row.certificate,
            valid_after: parse_timestamp(&row.valid_after)?,
            valid_before: parse_timestamp(&row.valid_before)?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// Store an issuance and return its record id.
    async fn save(&self, record: &NewCertificateRecord) -> Result<i64>;

    async fn find_by_uid(&self, uid: &Uuid) -> Result<Option<CertificateRecord>>;

    /// Certificates issued for a user key, newest first
    async fn list_by_user_fingerprint(&self, fingerprint: &str) -> Result<Vec<CertificateRecord>>;
}

// ============================================================================
// SQLx Implementation
// ============================================================================

#[derive(Debug, Clone)]
pub struct SqlxCertificateRepository {
    pool: DbPool,
}

impl SqlxCertificateRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CertificateStore for SqlxCertificateRepository {
    #[instrument(skip(self, record), fields(uid = %record.uid, remote_user = %record.remote_user), name = "db_save_certificate")]
    async fn save(&self, record: &NewCertificateRecord) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO certificates (
                uid, key_id, remote_user, remote_host, user_ip, command, public_key,
                user_fingerprint, ca_fingerprint, certificate, valid_after, valid_before, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(record.uid.to_string())
        .bind(&record.key_id)
        .bind(&record.remote_user)
        .bind(&record.remote_host)
        .bind(&record.user_ip)
        .bind(&record.command)
        .bind(&record.public_key)
        .bind(&record.user_fingerprint)
        .bind(&record.ca_fingerprint)
        .bind(&record.certificate)
        .bind(record.valid_after.to_rfc3339())
        .bind(record.valid_before.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::database(e, "Failed to store certificate"))?;

        Ok(id)
    }

    #[instrument(skip(self), fields(uid = %uid), name = "db_find_certificate_by_uid")]
    async fn find_by_uid(&self, uid: &Uuid) -> Result<Option<CertificateRecord>> {
        let row = sqlx::query_as::<_, CertificateRow>("SELECT * FROM certificates WHERE uid = $1")
            .bind(uid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::database(e, format!("Failed to fetch certificate {}", uid)))?;

        row.map(|r| r.try_into()).transpose()
    }

    #[instrument(skip(self), name = "db_list_certificates_by_fingerprint")]
    async fn list_by_user_fingerprint(&self, fingerprint: &str) -> Result<Vec<CertificateRecord>> {
        let rows = sqlx::query_as::<_, CertificateRow>(
            "SELECT * FROM certificates WHERE user_fingerprint = $1 ORDER BY id DESC",
        )
        .bind(fingerprint)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database(e, format!("Failed to list certificates for key {}", fingerprint)))?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}
