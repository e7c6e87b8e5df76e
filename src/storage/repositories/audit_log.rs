//! Audit log repository; the durable [`AuditSink`] behind the audit channel.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;
use uuid::Uuid;

use crate::audit::{AuditRecord, AuditSink};
use crate::errors::{Error, Result};
use crate::storage::DbPool;

#[derive(Debug, Clone, FromRow)]
struct AuditRow {
    uid: String,
    kind: String,
    target_uid: String,
    target_id: i64,
    start_time: String,
    end_time: String,
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::internal(format!("Invalid uuid '{}': {}", value, e)))
}

fn parse_time(value: &str) -> Result<chrono::DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::internal(format!("Invalid timestamp '{}': {}", value, e)))
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = Error;

    fn try_from(row: AuditRow) -> Result<Self> {
        Ok(AuditRecord {
            uid: parse_uuid(&row.uid)?,
            start_time: parse_time(&row.start_time)?,
            end_time: parse_time(&row.end_time)?,
            kind: row.kind,
            target_uid: parse_uuid(&row.target_uid)?,
            target_id: row.target_id,
        })
    }
}

/// SQLite-backed audit trail
#[derive(Debug, Clone)]
pub struct SqlxAuditLogRepository {
    pool: DbPool,
}

impl SqlxAuditLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Audit records referring to one certificate
    pub async fn list_for_target(&self, target_uid: &Uuid) -> Result<Vec<AuditRecord>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT uid, kind, target_uid, target_id, start_time, end_time FROM audit_log WHERE target_uid = $1 ORDER BY id",
        )
        .bind(target_uid.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::database(e, "Failed to list audit records"))?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

#[async_trait]
impl AuditSink for SqlxAuditLogRepository {
    async fn record(&self, record: &AuditRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO audit_log (uid, kind, target_uid, target_id, start_time, end_time, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.uid.to_string())
        .bind(&record.kind)
        .bind(record.target_uid.to_string())
        .bind(record.target_id)
        .bind(record.start_time.to_rfc3339())
        .bind(record.end_time.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::database(e, "Failed to write audit record"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::storage::create_pool;

    #[tokio::test]
    async fn test_record_and_list() {
        let config = DatabaseConfig { url: "sqlite::memory:".to_string(), ..Default::default() };
        let repo = SqlxAuditLogRepository::new(create_pool(&config).await.unwrap());

        let target = Uuid::new_v4();
        let record = AuditRecord::certificate_created(target, 3, Utc::now(), Utc::now());
        repo.record(&record).await.unwrap();

        let stored = repo.list_for_target(&target).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].uid, record.uid);
        assert_eq!(stored[0].kind, "cert.create");
        assert_eq!(stored[0].target_id, 3);

        assert!(repo.list_for_target(&Uuid::new_v4()).await.unwrap().is_empty());
    }
}
