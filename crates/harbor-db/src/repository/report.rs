//! # Report Repository
//!
//! Read-only rollups for the HQ dashboard.
//!
//! ## Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  daily_sales      orders (paid) ⋈ stores        per date + store        │
//! │  payment_mix      payments ⋈ methods ⋈ orders   per method code         │
//! │  store_ranking    orders (paid) ⋈ stores        per store               │
//! │  hq_summary       orders, stores, store_inventory ⋈ products,           │
//! │                   branch_sync_logs              one business date       │
//! │  sync_status      branch_sync_logs ⟕ stores     per status, per store   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here takes a write lock; reports may run alongside sales.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use harbor_core::{Money, SyncStatus};

// =============================================================================
// Row Types
// =============================================================================

/// Inclusive range of business dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    /// Today's local business date on both ends.
    pub fn today() -> Self {
        let today = Local::now().date_naive();
        DateRange { from: today, to: today }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySalesRow {
    pub business_date: NaiveDate,
    pub store_id: i64,
    pub store_name: String,
    pub order_count: i64,
    pub total_sales: Money,
    pub total_paid: Money,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentMixRow {
    pub method_code: String,
    pub method_name: String,
    pub txn_count: i64,
    pub total_amount: Money,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoreRankingRow {
    pub store_id: i64,
    pub store_name: String,
    pub order_count: i64,
    pub total_sales: Money,
    /// Average order total.
    pub avg_ticket: Money,
}

/// Number of uploads in one sync status.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SyncStatusCount {
    pub sync_status: SyncStatus,
    pub cnt: i64,
}

/// Upload activity of one source store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoreSyncRow {
    pub source_store_id: i64,
    /// `None` when the store id is unknown to HQ.
    pub store_name: Option<String>,
    pub upload_count: i64,
    pub last_upload_at: Option<String>,
    pub last_synced_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncStatusReport {
    pub summary: Vec<SyncStatusCount>,
    pub by_store: Vec<StoreSyncRow>,
}

/// Headline numbers of one business date.
#[derive(Debug, Clone, Serialize)]
pub struct HqSummary {
    pub business_date: NaiveDate,
    pub order_count: i64,
    pub total_sales: Money,
    pub active_store_count: i64,
    /// Active products at or below their safety stock, counted per store.
    pub low_stock_count: i64,
    pub sync_summary: Vec<SyncStatusCount>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for dashboard rollups.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Paid sales per business date and store, newest date first.
    ///
    /// `store_id` of `None` covers every store of the company.
    pub async fn daily_sales(
        &self,
        company_id: i64,
        store_id: Option<i64>,
        range: DateRange,
    ) -> DbResult<Vec<DailySalesRow>> {
        debug!(company_id, ?store_id, ?range, "Daily sales report");

        let rows = sqlx::query_as::<_, DailySalesRow>(
            r#"
            SELECT o.business_date, o.store_id, s.store_name,
                   COUNT(*) AS order_count,
                   SUM(o.total_amount) AS total_sales,
                   SUM(o.paid_amount) AS total_paid
            FROM orders o
            JOIN stores s ON s.id = o.store_id
            WHERE o.company_id = ?1
              AND o.business_date BETWEEN ?2 AND ?3
              AND o.status = 'paid'
              AND (?4 IS NULL OR o.store_id = ?4)
            GROUP BY o.business_date, o.store_id, s.store_name
            ORDER BY o.business_date DESC, o.store_id
            "#,
        )
        .bind(company_id)
        .bind(range.from)
        .bind(range.to)
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Payment totals per method, largest first.
    pub async fn payment_mix(
        &self,
        company_id: i64,
        store_id: Option<i64>,
        range: DateRange,
    ) -> DbResult<Vec<PaymentMixRow>> {
        let rows = sqlx::query_as::<_, PaymentMixRow>(
            r#"
            SELECT pm.code AS method_code, pm.name AS method_name,
                   COUNT(p.id) AS txn_count,
                   SUM(p.amount) AS total_amount
            FROM payments p
            JOIN payment_methods pm ON pm.id = p.payment_method_id
            JOIN orders o ON o.id = p.order_id
            WHERE p.company_id = ?1
              AND o.business_date BETWEEN ?2 AND ?3
              AND (?4 IS NULL OR o.store_id = ?4)
            GROUP BY pm.code, pm.name
            ORDER BY total_amount DESC
            "#,
        )
        .bind(company_id)
        .bind(range.from)
        .bind(range.to)
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Stores ranked by paid sales.
    pub async fn store_ranking(
        &self,
        company_id: i64,
        range: DateRange,
    ) -> DbResult<Vec<StoreRankingRow>> {
        let rows = sqlx::query_as::<_, StoreRankingRow>(
            r#"
            SELECT o.store_id, s.store_name,
                   COUNT(*) AS order_count,
                   IFNULL(SUM(o.total_amount), 0.0) AS total_sales,
                   IFNULL(AVG(o.total_amount), 0.0) AS avg_ticket
            FROM orders o
            JOIN stores s ON s.id = o.store_id
            WHERE o.company_id = ?1
              AND o.business_date BETWEEN ?2 AND ?3
              AND o.status = 'paid'
            GROUP BY o.store_id, s.store_name
            ORDER BY total_sales DESC
            "#,
        )
        .bind(company_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Headline numbers for one business date.
    pub async fn hq_summary(&self, company_id: i64, business_date: NaiveDate) -> DbResult<HqSummary> {
        let (order_count, total_sales): (i64, f64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), IFNULL(SUM(total_amount), 0.0)
            FROM orders
            WHERE company_id = ?1 AND business_date = ?2 AND status = 'paid'
            "#,
        )
        .bind(company_id)
        .bind(business_date)
        .fetch_one(&self.pool)
        .await?;

        let active_store_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE company_id = ?1 AND is_active = 1")
                .bind(company_id)
                .fetch_one(&self.pool)
                .await?;

        let low_stock_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM store_inventory i
            JOIN products p ON p.id = i.product_id
            WHERE i.company_id = ?1 AND i.qty_on_hand <= i.safety_stock AND p.is_active = 1
            "#,
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        let sync_summary = self.sync_counts(company_id).await?;

        Ok(HqSummary {
            business_date,
            order_count,
            total_sales: Money::from_amount(total_sales),
            active_store_count,
            low_stock_count,
            sync_summary,
        })
    }

    /// Upload counts by status and per source store.
    pub async fn sync_status(&self, company_id: i64) -> DbResult<SyncStatusReport> {
        let summary = self.sync_counts(company_id).await?;

        let by_store = sqlx::query_as::<_, StoreSyncRow>(
            r#"
            SELECT l.source_store_id, s.store_name,
                   COUNT(*) AS upload_count,
                   MAX(l.created_at) AS last_upload_at,
                   MAX(l.synced_at) AS last_synced_at
            FROM branch_sync_logs l
            LEFT JOIN stores s ON s.id = l.source_store_id
            WHERE l.company_id = ?1
            GROUP BY l.source_store_id, s.store_name
            ORDER BY last_upload_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SyncStatusReport { summary, by_store })
    }

    async fn sync_counts(&self, company_id: i64) -> DbResult<Vec<SyncStatusCount>> {
        let rows = sqlx::query_as::<_, SyncStatusCount>(
            r#"
            SELECT sync_status, COUNT(*) AS cnt
            FROM branch_sync_logs
            WHERE company_id = ?1
            GROUP BY sync_status
            ORDER BY sync_status
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_fixture, test_db};
    use harbor_core::{CreateOrder, OrderLineRequest, SyncUpload};

    fn order(fx: &crate::testing::Fixture, qty: f64, method: &str) -> CreateOrder {
        CreateOrder {
            company_id: fx.company_id,
            store_id: fx.store_id,
            cashier_id: None,
            items: vec![OrderLineRequest {
                product_id: fx.product_id,
                qty,
            }],
            payment_method_code: method.to_string(),
            payment_amount: None,
        }
    }

    #[tokio::test]
    async fn test_sales_rollups() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 100.0).await;

        // price 2.50
        db.orders().create_order(order(&fx, 2.0, "CASH")).await.unwrap();
        db.orders().create_order(order(&fx, 4.0, "CARD")).await.unwrap();

        let reports = db.reports();
        let range = DateRange::today();

        let daily = reports.daily_sales(fx.company_id, None, range).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].order_count, 2);
        assert_eq!(daily[0].total_sales.to_string(), "15.00");
        assert_eq!(daily[0].store_name, "Main Street");

        let filtered = reports
            .daily_sales(fx.company_id, Some(fx.store_id + 1), range)
            .await
            .unwrap();
        assert!(filtered.is_empty());

        let mix = reports.payment_mix(fx.company_id, None, range).await.unwrap();
        assert_eq!(mix.len(), 2);
        assert_eq!(mix[0].method_code, "CARD");
        assert_eq!(mix[0].total_amount.to_string(), "10.00");
        assert_eq!(mix[1].txn_count, 1);

        let ranking = reports.store_ranking(fx.company_id, range).await.unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].avg_ticket.to_string(), "7.50");
    }

    #[tokio::test]
    async fn test_hq_summary_and_sync_status() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 3.0).await;

        // 3 on hand, safety stock 5 → low stock
        let summary = db
            .reports()
            .hq_summary(fx.company_id, Local::now().date_naive())
            .await
            .unwrap();
        assert_eq!(summary.order_count, 0);
        assert_eq!(summary.total_sales.to_string(), "0.00");
        assert_eq!(summary.active_store_count, 1);
        assert_eq!(summary.low_stock_count, 1);
        assert!(summary.sync_summary.is_empty());

        let upload = SyncUpload {
            company_id: fx.company_id,
            source_store_id: fx.store_id,
            sync_type: "order_batch".to_string(),
            idempotency_key: "batch-1".to_string(),
            payload_json: "{}".to_string(),
        };
        db.sync_ingest().ingest(upload.clone()).await.unwrap();
        db.sync_ingest().ingest(upload).await.unwrap();

        let status = db.reports().sync_status(fx.company_id).await.unwrap();
        assert_eq!(status.summary.len(), 1);
        assert_eq!(status.summary[0].sync_status, SyncStatus::Duplicate);
        assert_eq!(status.summary[0].cnt, 1);
        assert_eq!(status.by_store[0].upload_count, 1);
        assert_eq!(status.by_store[0].store_name.as_deref(), Some("Main Street"));
    }
}
