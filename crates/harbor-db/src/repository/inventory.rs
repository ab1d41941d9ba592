//! # Inventory Ledger
//!
//! The only code that changes `store_inventory.qty_on_hand`.
//!
//! ## Ledger Pairing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  One unit of work (open transaction)                                    │
//! │                                                                         │
//! │   debit(conn, store, product, 3)       ──►  qty_on_hand: 5 → 2          │
//! │   append(conn, sale entry −3)          ──►  inventory_txns += 1         │
//! │                                                                         │
//! │   overwrite(conn, store, product, 7)   ──►  qty_on_hand: 10 → 7         │
//! │   append(conn, stocktake entry −3)     ──►  inventory_txns += 1         │
//! │                                                                         │
//! │  COMMIT makes both visible together; ROLLBACK discards both.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutating functions take the caller's `&mut SqliteConnection` so they can
//! only run inside the caller's transaction. Reads go through
//! [`InventoryRepository`] on the pool.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbResult, ServiceResult};
use harbor_core::{
    CoreError, InventoryTransaction, NewInventoryTransaction, StoreInventory, QTY_EPSILON,
};

// =============================================================================
// Mutations (inside a unit of work)
// =============================================================================

/// Conditionally debits `qty` units.
///
/// A single `UPDATE … WHERE qty_on_hand >= ?` so two concurrent sales can
/// never both take the last unit. The comparison allows `QTY_EPSILON` of
/// float noise, and a remainder within that noise is stored as 0. Zero
/// affected rows (not enough stock, or no inventory row at all) leaves the
/// quantity untouched and returns `InsufficientStock`.
pub async fn debit(
    conn: &mut SqliteConnection,
    store_id: i64,
    product_id: i64,
    qty: f64,
) -> ServiceResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE store_inventory
        SET qty_on_hand = CASE
                WHEN qty_on_hand - ?1 < ?4 THEN 0.0
                ELSE qty_on_hand - ?1
            END
        WHERE store_id = ?2 AND product_id = ?3 AND qty_on_hand >= ?1 - ?4
        "#,
    )
    .bind(qty)
    .bind(store_id)
    .bind(product_id)
    .bind(QTY_EPSILON)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        debug!(store_id, product_id, qty, "Debit rejected");
        return Err(CoreError::InsufficientStock(product_id).into());
    }

    debug!(store_id, product_id, qty, "Debited stock");
    Ok(())
}

/// Sets the quantity to `new_qty` and returns the previous quantity.
///
/// Fails with `InventoryRecordNotFound` when the pair was never initialized.
pub async fn overwrite(
    conn: &mut SqliteConnection,
    store_id: i64,
    product_id: i64,
    new_qty: f64,
) -> ServiceResult<f64> {
    let previous: Option<f64> = sqlx::query_scalar(
        "SELECT qty_on_hand FROM store_inventory WHERE store_id = ?1 AND product_id = ?2",
    )
    .bind(store_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    let previous = previous.ok_or(CoreError::InventoryRecordNotFound(product_id))?;

    sqlx::query(
        "UPDATE store_inventory SET qty_on_hand = ?1 WHERE store_id = ?2 AND product_id = ?3",
    )
    .bind(new_qty)
    .bind(store_id)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    debug!(store_id, product_id, previous, new_qty, "Overwrote stock");
    Ok(previous)
}

/// Appends an immutable ledger entry and returns its id.
pub async fn append(conn: &mut SqliteConnection, entry: &NewInventoryTransaction) -> DbResult<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO inventory_txns (
            company_id, store_id, product_id, txn_type, ref_type, ref_id,
            qty_change, qty_after, reason, created_by, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        RETURNING id
        "#,
    )
    .bind(entry.company_id)
    .bind(entry.store_id)
    .bind(entry.product_id)
    .bind(entry.txn_type)
    .bind(entry.ref_type)
    .bind(entry.ref_id)
    .bind(entry.qty_change)
    .bind(entry.qty_after)
    .bind(entry.reason)
    .bind(entry.created_by)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    debug!(
        id,
        product_id = entry.product_id,
        txn_type = entry.txn_type.as_str(),
        qty_change = entry.qty_change,
        "Appended ledger entry"
    );
    Ok(id)
}

/// Creates (or resets) the inventory row of a store/product pair.
///
/// Opening balances only: seeding and onboarding a new store. Not a sale or
/// stocktake, so no ledger entry is written.
pub async fn initialize(
    conn: &mut SqliteConnection,
    company_id: i64,
    store_id: i64,
    product_id: i64,
    qty_on_hand: f64,
    safety_stock: f64,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO store_inventory (company_id, store_id, product_id, qty_on_hand, safety_stock)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (store_id, product_id)
        DO UPDATE SET qty_on_hand = excluded.qty_on_hand, safety_stock = excluded.safety_stock
        "#,
    )
    .bind(company_id)
    .bind(store_id)
    .bind(product_id)
    .bind(qty_on_hand)
    .bind(safety_stock)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Reads
// =============================================================================

/// Read access to store inventory and the ledger.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Current quantity of a store/product pair, `None` if never initialized.
    pub async fn quantity_on_hand(&self, store_id: i64, product_id: i64) -> DbResult<Option<f64>> {
        let qty = sqlx::query_scalar(
            "SELECT qty_on_hand FROM store_inventory WHERE store_id = ?1 AND product_id = ?2",
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(qty)
    }

    /// Full inventory row of a store/product pair.
    pub async fn get(&self, store_id: i64, product_id: i64) -> DbResult<Option<StoreInventory>> {
        let row = sqlx::query_as::<_, StoreInventory>(
            r#"
            SELECT company_id, store_id, product_id, qty_on_hand, safety_stock
            FROM store_inventory
            WHERE store_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Ledger entries of a store/product pair in insertion order.
    pub async fn entries_for(
        &self,
        store_id: i64,
        product_id: i64,
    ) -> DbResult<Vec<InventoryTransaction>> {
        let entries = sqlx::query_as::<_, InventoryTransaction>(
            r#"
            SELECT id, company_id, store_id, product_id, txn_type, ref_type, ref_id,
                   qty_change, qty_after, reason, created_by, created_at
            FROM inventory_txns
            WHERE store_id = ?1 AND product_id = ?2
            ORDER BY id
            "#,
        )
        .bind(store_id)
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Opening balance outside any larger unit of work.
    pub async fn initialize(
        &self,
        company_id: i64,
        store_id: i64,
        product_id: i64,
        qty_on_hand: f64,
        safety_stock: f64,
    ) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        initialize(&mut conn, company_id, store_id, product_id, qty_on_hand, safety_stock).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testing::{seed_fixture, test_db};
    use harbor_core::TxnType;

    #[tokio::test]
    async fn test_debit_is_conditional() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 5.0).await;
        let mut conn = db.pool().acquire().await.unwrap();

        debit(&mut conn, fx.store_id, fx.product_id, 3.0).await.unwrap();

        let err = debit(&mut conn, fx.store_id, fx.product_id, 3.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InsufficientStock(id)) if id == fx.product_id
        ));
        drop(conn);

        let qty = db.inventory().quantity_on_hand(fx.store_id, fx.product_id).await.unwrap();
        assert_eq!(qty, Some(2.0));
    }

    #[tokio::test]
    async fn test_fractional_debits_tolerate_float_noise() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 0.3).await;
        let mut conn = db.pool().acquire().await.unwrap();

        for _ in 0..3 {
            debit(&mut conn, fx.store_id, fx.product_id, 0.1).await.unwrap();
        }

        let err = debit(&mut conn, fx.store_id, fx.product_id, 0.1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InsufficientStock(_))));
        drop(conn);

        let qty = db.inventory().quantity_on_hand(fx.store_id, fx.product_id).await.unwrap();
        assert_eq!(qty, Some(0.0));
    }

    #[tokio::test]
    async fn test_debit_without_inventory_row() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 5.0).await;
        let mut conn = db.pool().acquire().await.unwrap();

        let err = debit(&mut conn, fx.store_id, 9999, 1.0).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InsufficientStock(9999))));
    }

    #[tokio::test]
    async fn test_overwrite_returns_previous() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 10.0).await;
        let mut conn = db.pool().acquire().await.unwrap();

        let previous = overwrite(&mut conn, fx.store_id, fx.product_id, 7.0).await.unwrap();
        assert_eq!(previous, 10.0);

        let err = overwrite(&mut conn, fx.store_id, 4242, 1.0).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InventoryRecordNotFound(4242))
        ));
    }

    #[tokio::test]
    async fn test_entries_in_insertion_order() {
        let db = test_db().await;
        let fx = seed_fixture(&db, 10.0).await;
        let mut conn = db.pool().acquire().await.unwrap();

        let sale = NewInventoryTransaction::sale(fx.company_id, fx.store_id, fx.product_id, 1, 2.0, None);
        let count = NewInventoryTransaction::stocktake(
            fx.company_id,
            fx.store_id,
            fx.product_id,
            1,
            -1.0,
            7.0,
            1,
        );
        append(&mut conn, &sale).await.unwrap();
        append(&mut conn, &count).await.unwrap();
        drop(conn);

        let entries = db.inventory().entries_for(fx.store_id, fx.product_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].txn_type, TxnType::Sale);
        assert_eq!(entries[0].qty_change, -2.0);
        assert_eq!(entries[0].reason, "POS sale");
        assert_eq!(entries[1].txn_type, TxnType::Stocktake);
        assert_eq!(entries[1].qty_after, Some(7.0));
    }
}
