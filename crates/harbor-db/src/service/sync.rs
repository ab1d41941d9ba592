//! # Sync Ingestor
//!
//! Idempotent intake of branch batch uploads.
//!
//! ## Delivery Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Branch uploads batch "b-001" ──► INSERT → received  (payload stored)   │
//! │       │                                                                 │
//! │       │ network drops the response, branch retries                      │
//! │       ▼                                                                 │
//! │  Branch uploads batch "b-001" ──► key conflict → duplicate              │
//! │                                   synced_at refreshed, payload kept     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The upsert is one statement, so concurrent deliveries of the same key are
//! serialized by SQLite and exactly one of them observes `received`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbResult, ServiceResult};
use harbor_core::validation::validate_sync_upload;
use harbor_core::{SyncStatus, SyncUpload, SyncUploadOutcome, SyncUploadRecord};

/// Branch upload intake.
#[derive(Debug, Clone)]
pub struct SyncIngestor {
    pool: SqlitePool,
}

impl SyncIngestor {
    /// Creates a new SyncIngestor.
    pub fn new(pool: SqlitePool) -> Self {
        SyncIngestor { pool }
    }

    /// Stores an upload, or marks a repeated key as duplicate.
    pub async fn ingest(&self, upload: SyncUpload) -> ServiceResult<SyncUploadOutcome> {
        let key = validate_sync_upload(
            upload.source_store_id,
            &upload.sync_type,
            &upload.idempotency_key,
        )?;
        let now = Utc::now();

        let status: SyncStatus = sqlx::query_scalar(
            r#"
            INSERT INTO branch_sync_logs (
                company_id, source_store_id, sync_type, idempotency_key,
                payload_json, sync_status, created_at, synced_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (idempotency_key)
            DO UPDATE SET sync_status = ?8, synced_at = excluded.synced_at
            RETURNING sync_status
            "#,
        )
        .bind(upload.company_id)
        .bind(upload.source_store_id)
        .bind(&upload.sync_type)
        .bind(&key)
        .bind(&upload.payload_json)
        .bind(SyncStatus::Received)
        .bind(now)
        .bind(SyncStatus::Duplicate)
        .fetch_one(&self.pool)
        .await?;

        info!(
            source_store_id = upload.source_store_id,
            idempotency_key = %key,
            ?status,
            "Sync upload ingested"
        );

        Ok(SyncUploadOutcome {
            source_store_id: upload.source_store_id,
            idempotency_key: key,
            status,
        })
    }

    /// Stored upload by idempotency key.
    pub async fn get(&self, idempotency_key: &str) -> DbResult<Option<SyncUploadRecord>> {
        let record = sqlx::query_as::<_, SyncUploadRecord>(
            r#"
            SELECT id, company_id, source_store_id, sync_type, idempotency_key,
                   payload_json, sync_status, created_at, synced_at
            FROM branch_sync_logs
            WHERE idempotency_key = ?1
            "#,
        )
        .bind(idempotency_key.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
