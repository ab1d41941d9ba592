//! POST /api/inventory/check

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use harbor_core::{CheckReceipt, CountLineRequest, SubmitCheck, DEFAULT_CHECKER_ID};

use super::{default_company_id, default_store_id};
use crate::error::{ApiOk, ApiResult};
use crate::AppState;

fn default_checker_id() -> i64 {
    DEFAULT_CHECKER_ID
}

#[derive(Debug, Deserialize)]
pub struct SubmitCheckBody {
    #[serde(default = "default_company_id")]
    pub company_id: i64,
    #[serde(default = "default_store_id")]
    pub store_id: i64,
    #[serde(default = "default_checker_id")]
    pub checked_by: i64,
    #[serde(default)]
    pub items: Vec<CountLineRequest>,
}

pub async fn submit_check(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SubmitCheckBody>, JsonRejection>,
) -> ApiResult<CheckReceipt> {
    let Json(body) = body?;
    let receipt = state
        .db
        .stocktakes()
        .submit_check(SubmitCheck {
            company_id: body.company_id,
            store_id: body.store_id,
            checker_id: body.checked_by,
            items: body.items,
        })
        .await?;
    Ok(ApiOk(receipt))
}
