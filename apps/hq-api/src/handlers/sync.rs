//! Branch uploads: POST /api/sync/upload, GET /api/sync/status

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use harbor_core::{SyncUpload, SyncUploadOutcome, DEFAULT_SYNC_TYPE};
use harbor_db::repository::report::SyncStatusReport;

use super::default_company_id;
use crate::error::{ApiOk, ApiResult};
use crate::AppState;

fn default_sync_type() -> String {
    DEFAULT_SYNC_TYPE.to_string()
}

#[derive(Debug, Deserialize)]
pub struct SyncUploadBody {
    #[serde(default = "default_company_id")]
    pub company_id: i64,
    #[serde(default)]
    pub source_store_id: i64,
    #[serde(default = "default_sync_type")]
    pub sync_type: String,
    #[serde(default)]
    pub idempotency_key: String,
    /// Stored verbatim as JSON text; absent means an empty list.
    #[serde(default)]
    pub payload: Option<Value>,
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SyncUploadBody>, JsonRejection>,
) -> ApiResult<SyncUploadOutcome> {
    let Json(body) = body?;
    let payload = body.payload.unwrap_or_else(|| Value::Array(Vec::new()));

    let outcome = state
        .db
        .sync_ingest()
        .ingest(SyncUpload {
            company_id: body.company_id,
            source_store_id: body.source_store_id,
            sync_type: body.sync_type,
            idempotency_key: body.idempotency_key,
            payload_json: payload.to_string(),
        })
        .await?;
    Ok(ApiOk(outcome))
}

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    #[serde(default = "default_company_id")]
    pub company_id: i64,
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CompanyQuery>, QueryRejection>,
) -> ApiResult<SyncStatusReport> {
    let Query(query) = query?;
    let report = state.db.reports().sync_status(query.company_id).await?;
    Ok(ApiOk(report))
}
