//! Read-only rollups for the head-office dashboard.
//!
//! Dates are `YYYY-MM-DD` and default to today; `store_id` 0 or absent means
//! all stores.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use harbor_db::repository::report::{DailySalesRow, HqSummary, PaymentMixRow, StoreRankingRow};
use harbor_db::DateRange;

use super::default_company_id;
use crate::error::{ApiOk, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default = "default_company_id")]
    pub company_id: i64,
    #[serde(default)]
    pub store_id: Option<i64>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl RangeQuery {
    fn store_filter(&self) -> Option<i64> {
        self.store_id.filter(|id| *id > 0)
    }

    fn range(&self) -> DateRange {
        let today = DateRange::today();
        DateRange::new(self.from.unwrap_or(today.from), self.to.unwrap_or(today.to))
    }
}

pub async fn daily_sales(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Vec<DailySalesRow>> {
    let Query(query) = query?;
    let rows = state
        .db
        .reports()
        .daily_sales(query.company_id, query.store_filter(), query.range())
        .await?;
    Ok(ApiOk(rows))
}

pub async fn payment_mix(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Vec<PaymentMixRow>> {
    let Query(query) = query?;
    let rows = state
        .db
        .reports()
        .payment_mix(query.company_id, query.store_filter(), query.range())
        .await?;
    Ok(ApiOk(rows))
}

pub async fn store_ranking(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> ApiResult<Vec<StoreRankingRow>> {
    let Query(query) = query?;
    let rows = state
        .db
        .reports()
        .store_ranking(query.company_id, query.range())
        .await?;
    Ok(ApiOk(rows))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default = "default_company_id")]
    pub company_id: i64,
    #[serde(default)]
    pub business_date: Option<NaiveDate>,
}

pub async fn hq_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> ApiResult<HqSummary> {
    let Query(query) = query?;
    let date = query
        .business_date
        .unwrap_or_else(|| Local::now().date_naive());
    let summary = state.db.reports().hq_summary(query.company_id, date).await?;
    Ok(ApiOk(summary))
}
