//! # Stocktake Service
//!
//! Reconciles counted quantities against the system quantity.
//!
//! ## Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product 42: system 10, counted 7                                       │
//! │                                                                         │
//! │  inventory_check_items   system 10 │ counted 7 │ diff −3                │
//! │  store_inventory         qty_on_hand 10 → 7                             │
//! │  inventory_txns          stocktake, change −3, after 7                  │
//! │                                                                         │
//! │  product 43: system 4, counted 4                                        │
//! │                                                                         │
//! │  inventory_check_items   system 4 │ counted 4 │ diff 0                  │
//! │  store_inventory         unchanged value                                │
//! │  inventory_txns          (no entry: |diff| <= 0.0001)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The overwrite is not guarded against a sale that committed between the
//! physical count and the submission; the counted value wins.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult, ServiceResult};
use crate::repository::{audit, inventory};
use crate::service::{finish, ServiceConfig};
use harbor_core::money::is_negligible;
use harbor_core::validation::validate_count_lines;
use harbor_core::{
    CheckReceipt, CheckStatus, CoreError, InventoryCheck, InventoryCheckItem, NewAuditEntry,
    NewInventoryTransaction, SubmitCheck, CHECK_PREFIX,
};

/// Stocktake reconciler.
#[derive(Debug, Clone)]
pub struct StocktakeService {
    pool: SqlitePool,
    config: ServiceConfig,
}

impl StocktakeService {
    /// Creates a new StocktakeService.
    pub fn new(pool: SqlitePool, config: ServiceConfig) -> Self {
        StocktakeService { pool, config }
    }

    /// Records a stock count and overwrites every counted quantity.
    pub async fn submit_check(&self, request: SubmitCheck) -> ServiceResult<CheckReceipt> {
        validate_count_lines(&request.items)?;

        let mut tx = self.pool.begin().await?;
        let outcome = self.run(&mut tx, &request).await;

        if let Err(err) = &outcome {
            warn!(store_id = request.store_id, error = %err, "Inventory check rolled back");
        }

        let receipt = finish(tx, outcome).await?;

        info!(
            check_id = receipt.check_id,
            check_no = %receipt.check_no,
            store_id = request.store_id,
            items = request.items.len(),
            adjusted = receipt.adjusted_lines,
            "Inventory check submitted"
        );
        Ok(receipt)
    }

    async fn run(
        &self,
        conn: &mut SqliteConnection,
        request: &SubmitCheck,
    ) -> ServiceResult<CheckReceipt> {
        let (check_id, check_no) = self.insert_check(conn, request).await?;
        let mut adjusted_lines = 0;

        for line in &request.items {
            let system_qty =
                inventory::overwrite(conn, request.store_id, line.product_id, line.counted_qty)
                    .await?;
            let diff = line.counted_qty - system_qty;

            sqlx::query(
                r#"
                INSERT INTO inventory_check_items (check_id, product_id, system_qty, counted_qty, diff_qty)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(check_id)
            .bind(line.product_id)
            .bind(system_qty)
            .bind(line.counted_qty)
            .bind(diff)
            .execute(&mut *conn)
            .await?;

            if !is_negligible(diff) {
                inventory::append(
                    conn,
                    &NewInventoryTransaction::stocktake(
                        request.company_id,
                        request.store_id,
                        line.product_id,
                        check_id,
                        diff,
                        line.counted_qty,
                        request.checker_id,
                    ),
                )
                .await?;
                adjusted_lines += 1;
            }
        }

        audit::append(
            conn,
            &NewAuditEntry::check_submitted(
                request.company_id,
                request.store_id,
                request.checker_id,
                check_id,
                &check_no,
                request.items.len(),
            ),
        )
        .await?;

        Ok(CheckReceipt {
            check_id,
            check_no,
            adjusted_lines,
        })
    }

    async fn insert_check(
        &self,
        conn: &mut SqliteConnection,
        request: &SubmitCheck,
    ) -> ServiceResult<(i64, String)> {
        for attempt in 1..=self.config.number_attempts {
            let check_no = self.config.numbers.next_number(CHECK_PREFIX);

            let inserted: Result<i64, sqlx::Error> = sqlx::query_scalar(
                r#"
                INSERT INTO inventory_checks (company_id, store_id, check_no, status, checked_by, checked_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                RETURNING id
                "#,
            )
            .bind(request.company_id)
            .bind(request.store_id)
            .bind(&check_no)
            .bind(CheckStatus::Done)
            .bind(request.checker_id)
            .bind(Utc::now())
            .fetch_one(&mut *conn)
            .await;

            match inserted.map_err(DbError::from) {
                Ok(check_id) => {
                    debug!(check_id, check_no = %check_no, attempt, "Inserted inventory check");
                    return Ok((check_id, check_no));
                }
                Err(err) if err.is_unique_violation_on("check_no") => {
                    warn!(check_no = %check_no, attempt, "Check number taken, drawing another");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(CoreError::DocumentNumberExhausted {
            prefix: CHECK_PREFIX,
            attempts: self.config.number_attempts,
        }
        .into())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Gets a check by ID.
    pub async fn get(&self, check_id: i64) -> DbResult<Option<InventoryCheck>> {
        let check = sqlx::query_as::<_, InventoryCheck>(
            r#"
            SELECT id, company_id, store_id, check_no, status, checked_by, checked_at
            FROM inventory_checks
            WHERE id = ?1
            "#,
        )
        .bind(check_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(check)
    }

    /// Counted lines of a check in submission order.
    pub async fn items(&self, check_id: i64) -> DbResult<Vec<InventoryCheckItem>> {
        let items = sqlx::query_as::<_, InventoryCheckItem>(
            r#"
            SELECT id, check_id, product_id, system_qty, counted_qty, diff_qty
            FROM inventory_check_items
            WHERE check_id = ?1
            ORDER BY id
            "#,
        )
        .bind(check_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testing::{seed_fixture, test_db, test_db_with, Fixture, ScriptedNumbers};
    use harbor_core::{CountLineRequest, TxnType};
    use std::sync::Arc;

    fn count(fx: &Fixture, lines: &[(i64, f64)]) -> SubmitCheck {
        SubmitCheck {
            company_id: fx.company_id,
            store_id: fx.store_id,
            checker_id: 3,
            items: lines
                .iter()
                .map(|&(product_id, counted_qty)| CountLineRequest {
                    product_id,
                    counted_qty,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_count_below_system_adjusts() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 10.0).await;

        let receipt = db
            .stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 7.0)]))
            .await
            .unwrap();
        assert!(receipt.check_no.starts_with("CHK"));
        assert_eq!(receipt.adjusted_lines, 1);

        let qty = db.inventory().quantity_on_hand(fx.store_id, fx.product_id).await.unwrap();
        assert_eq!(qty, Some(7.0));

        let items = db.stocktakes().items(receipt.check_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].system_qty, 10.0);
        assert_eq!(items[0].counted_qty, 7.0);
        assert_eq!(items[0].diff_qty, -3.0);

        let entries = db.inventory().entries_for(fx.store_id, fx.product_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].txn_type, TxnType::Stocktake);
        assert_eq!(entries[0].qty_change, -3.0);
        assert_eq!(entries[0].qty_after, Some(7.0));
        assert_eq!(entries[0].ref_type, "inventory_check");
        assert_eq!(entries[0].ref_id, receipt.check_id);
        assert_eq!(entries[0].created_by, Some(3));

        let check = db.stocktakes().get(receipt.check_id).await.unwrap().unwrap();
        assert_eq!(check.status, CheckStatus::Done);

        let audit = db.audit().entries_for("inventory_checks", receipt.check_id).await.unwrap();
        assert_eq!(audit.len(), 1);
        let detail: serde_json::Value = serde_json::from_str(&audit[0].detail_json).unwrap();
        assert_eq!(detail["item_count"], 1);
    }

    #[tokio::test]
    async fn test_matching_count_writes_no_ledger_entry() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 10.0).await;

        let receipt = db
            .stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 10.00005)]))
            .await
            .unwrap();
        assert_eq!(receipt.adjusted_lines, 0);

        let items = db.stocktakes().items(receipt.check_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!(db.inventory().entries_for(fx.store_id, fx.product_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_inventory_row_rolls_back_whole_check() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 10.0).await;
        let unstocked = fx.add_product(&db, "SKU-2", 1.0).await;

        let err = db
            .stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 4.0), (unstocked, 1.0)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InventoryRecordNotFound(id)) if id == unstocked
        ));

        let qty = db.inventory().quantity_on_hand(fx.store_id, fx.product_id).await.unwrap();
        assert_eq!(qty, Some(10.0));
        assert!(db.inventory().entries_for(fx.store_id, fx.product_id).await.unwrap().is_empty());
        assert_eq!(db.audit().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_after_sale_reconciles() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 10.0).await;

        db.orders()
            .create_order(harbor_core::CreateOrder {
                company_id: fx.company_id,
                store_id: fx.store_id,
                cashier_id: None,
                items: vec![harbor_core::OrderLineRequest {
                    product_id: fx.product_id,
                    qty: 2.0,
                }],
                payment_method_code: "CASH".to_string(),
                payment_amount: None,
            })
            .await
            .unwrap();

        db.stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 9.0)]))
            .await
            .unwrap();

        // 10 − 2 (sale) + 1 (stocktake) = 9
        let entries = db.inventory().entries_for(fx.store_id, fx.product_id).await.unwrap();
        let change: f64 = entries.iter().map(|e| e.qty_change).sum();
        assert_eq!(entries.len(), 2);
        assert!(harbor_core::money::approx_eq(10.0 + change, 9.0));
    }

    #[tokio::test]
    async fn test_check_number_collision_is_retried() {
        let numbers = Arc::new(ScriptedNumbers::new(&["CHK-A", "CHK-A", "CHK-B"]));
        let db = test_db_with(ServiceConfig::default().numbers(numbers)).await;
        let fx = seed_fixture(&db, 10.0).await;

        let first = db
            .stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 9.0)]))
            .await
            .unwrap();
        let second = db
            .stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 8.0)]))
            .await
            .unwrap();

        assert_eq!(first.check_no, "CHK-A");
        assert_eq!(second.check_no, "CHK-B");
        assert_eq!(
            db.inventory().quantity_on_hand(fx.store_id, fx.product_id).await.unwrap(),
            Some(8.0)
        );
    }

    #[tokio::test]
    async fn test_check_number_exhaustion() {
        let numbers = Arc::new(ScriptedNumbers::new(&["CHK-A", "CHK-A", "CHK-A"]));
        let config = ServiceConfig::default().numbers(numbers).number_attempts(2);
        let db = test_db_with(config).await;
        let fx = seed_fixture(&db, 10.0).await;

        db.stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 9.0)]))
            .await
            .unwrap();
        let err = db
            .stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, 4.0)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Core(CoreError::DocumentNumberExhausted { prefix: "CHK", attempts: 2 })
        ));
        assert_eq!(
            db.inventory().quantity_on_hand(fx.store_id, fx.product_id).await.unwrap(),
            Some(9.0)
        );
        let entries = db.inventory().entries_for(fx.store_id, fx.product_id).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_lines_rejected() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 10.0).await;

        let err = db.stocktakes().submit_check(count(&fx, &[])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::ItemsRequired)));

        let err = db
            .stocktakes()
            .submit_check(count(&fx, &[(fx.product_id, -2.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InvalidItem { .. })));
    }
}
