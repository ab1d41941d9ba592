//! # Audit Log
//!
//! Append-only trail of business events. Entries are written inside the
//! unit of work they describe, so a rolled-back order leaves no audit row.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use harbor_core::{AuditEntry, NewAuditEntry};

/// Actor type of entries written by terminal requests.
pub const ACTOR_USER: &str = "user";

/// Appends an entry on the caller's connection and returns its id.
pub async fn append(conn: &mut SqliteConnection, entry: &NewAuditEntry) -> DbResult<i64> {
    let detail_json = serde_json::to_string(&entry.detail)?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO audit_logs (
            company_id, store_id, actor_type, actor_id, action,
            entity_type, entity_id, detail_json, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        RETURNING id
        "#,
    )
    .bind(entry.company_id)
    .bind(entry.store_id)
    .bind(ACTOR_USER)
    .bind(entry.actor_id)
    .bind(entry.action)
    .bind(entry.entity_type)
    .bind(entry.entity_id)
    .bind(detail_json)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    debug!(id, action = entry.action, entity_id = entry.entity_id, "Appended audit entry");
    Ok(id)
}

/// Read access to the audit trail.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    /// Creates a new AuditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Entries about one entity, oldest first.
    pub async fn entries_for(&self, entity_type: &str, entity_id: i64) -> DbResult<Vec<AuditEntry>> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            r#"
            SELECT id, company_id, store_id, actor_type, actor_id, action,
                   entity_type, entity_id, detail_json, created_at
            FROM audit_logs
            WHERE entity_type = ?1 AND entity_id = ?2
            ORDER BY id
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Total number of entries (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_db;
    use harbor_core::Money;

    #[tokio::test]
    async fn test_append_and_read_back() {
        let db = test_db().await;
        let entry = NewAuditEntry::order_created(1, 1, Some(7), 42, "SO20260101000000100", Money::from_amount(12.5));

        let mut conn = db.pool().acquire().await.unwrap();
        append(&mut conn, &entry).await.unwrap();
        drop(conn);

        let entries = db.audit().entries_for("order", 42).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_type, "user");
        assert_eq!(entries[0].actor_id, Some(7));
        assert_eq!(entries[0].action, "create_order");

        let detail: serde_json::Value = serde_json::from_str(&entries[0].detail_json).unwrap();
        assert_eq!(detail["total"], "12.50");
    }
}
