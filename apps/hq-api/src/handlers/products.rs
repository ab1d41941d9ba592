//! Catalog reads for terminals: GET /api/products, GET /api/products/by-qr/{code}

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};

use harbor_core::{StoreProduct, PRODUCT_LIST_LIMIT};

use super::StoreQuery;
use crate::error::{ApiError, ApiOk, ApiResult};
use crate::AppState;

/// Newest active products with the store's stock.
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StoreQuery>, QueryRejection>,
) -> ApiResult<Vec<StoreProduct>> {
    let Query(query) = query?;
    let rows = state
        .db
        .catalog()
        .list_products(query.company_id, query.store_id, PRODUCT_LIST_LIMIT)
        .await?;
    Ok(ApiOk(rows))
}

/// Scan lookup by QR code or barcode.
pub async fn by_code(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    query: Result<Query<StoreQuery>, QueryRejection>,
) -> ApiResult<StoreProduct> {
    let Query(query) = query?;
    state
        .db
        .catalog()
        .find_by_code(query.company_id, query.store_id, &code)
        .await?
        .map(ApiOk)
        .ok_or_else(|| ApiError::NotFound("PRODUCT_NOT_FOUND".to_string()))
}
