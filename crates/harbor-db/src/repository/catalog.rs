//! # Catalog Repository
//!
//! Products, stores and payment methods. Read-only from the point of view of
//! the transactional services; the write methods exist for seeding and
//! onboarding.
//!
//! ## Terminal Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier scans a code: "4710018000019"                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find_by_code(company, store, code)                                     │
//! │       │   qr_code = code OR barcode = code, active products only        │
//! │       ▼                                                                 │
//! │  products ──LEFT JOIN── store_inventory (this store)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreProduct { name, price, qty_on_hand (0 if no row) }                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use harbor_core::{NewProduct, PaymentMethod, Product, Store, StoreProduct};

const PRODUCT_COLUMNS: &str =
    "id, company_id, sku, qr_code, barcode, name, price, cost, is_active";

// =============================================================================
// Lookups inside a unit of work
// =============================================================================

/// Active product of a company, `None` if missing, foreign or inactive.
pub async fn find_active_product(
    conn: &mut SqliteConnection,
    company_id: i64,
    product_id: i64,
) -> DbResult<Option<Product>> {
    let sql = format!(
        "SELECT {} FROM products WHERE id = ?1 AND company_id = ?2 AND is_active = 1",
        PRODUCT_COLUMNS
    );

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .bind(company_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(product)
}

/// Payment method of a company by code.
pub async fn find_payment_method(
    conn: &mut SqliteConnection,
    company_id: i64,
    code: &str,
) -> DbResult<Option<PaymentMethod>> {
    let method = sqlx::query_as::<_, PaymentMethod>(
        "SELECT id, company_id, code, name FROM payment_methods WHERE company_id = ?1 AND code = ?2",
    )
    .bind(company_id)
    .bind(code)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(method)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog reads.
///
/// ## Usage
/// ```rust,ignore
/// let rows = db.catalog().list_products(1, 1, 200).await?;
/// let hit = db.catalog().find_by_code(1, 1, "4710018000019").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Active products with this store's quantity, newest first.
    pub async fn list_products(
        &self,
        company_id: i64,
        store_id: i64,
        limit: i64,
    ) -> DbResult<Vec<StoreProduct>> {
        debug!(company_id, store_id, limit, "Listing products");

        let rows = sqlx::query_as::<_, StoreProduct>(
            r#"
            SELECT p.id, p.sku, p.qr_code, p.barcode, p.name, p.price,
                   IFNULL(i.qty_on_hand, 0.0) AS qty_on_hand
            FROM products p
            LEFT JOIN store_inventory i ON i.product_id = p.id AND i.store_id = ?2
            WHERE p.company_id = ?1 AND p.is_active = 1
            ORDER BY p.id DESC
            LIMIT ?3
            "#,
        )
        .bind(company_id)
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active product whose QR code or barcode equals `code`.
    pub async fn find_by_code(
        &self,
        company_id: i64,
        store_id: i64,
        code: &str,
    ) -> DbResult<Option<StoreProduct>> {
        let row = sqlx::query_as::<_, StoreProduct>(
            r#"
            SELECT p.id, p.sku, p.qr_code, p.barcode, p.name, p.price,
                   IFNULL(i.qty_on_hand, 0.0) AS qty_on_hand
            FROM products p
            LEFT JOIN store_inventory i ON i.product_id = p.id AND i.store_id = ?2
            WHERE p.company_id = ?1 AND p.is_active = 1
              AND (p.qr_code = ?3 OR p.barcode = ?3)
            ORDER BY p.id
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(store_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Active product by id.
    pub async fn find_active_product(
        &self,
        company_id: i64,
        product_id: i64,
    ) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        find_active_product(&mut conn, company_id, product_id).await
    }

    /// Payment method by code.
    pub async fn find_payment_method(
        &self,
        company_id: i64,
        code: &str,
    ) -> DbResult<Option<PaymentMethod>> {
        let mut conn = self.pool.acquire().await?;
        find_payment_method(&mut conn, company_id, code).await
    }

    /// Stores of a company.
    pub async fn list_stores(&self, company_id: i64) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT id, company_id, store_code, store_name, is_active FROM stores WHERE company_id = ?1 ORDER BY id",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    // -------------------------------------------------------------------------
    // Onboarding
    // -------------------------------------------------------------------------

    /// Inserts a store and returns its id.
    pub async fn insert_store(&self, company_id: i64, code: &str, name: &str) -> DbResult<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO stores (company_id, store_code, store_name, is_active) VALUES (?1, ?2, ?3, 1) RETURNING id",
        )
        .bind(company_id)
        .bind(code)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        debug!(id, code, "Inserted store");
        Ok(id)
    }

    /// Activates or deactivates a store.
    pub async fn set_store_active(&self, store_id: i64, active: bool) -> DbResult<()> {
        sqlx::query("UPDATE stores SET is_active = ?1 WHERE id = ?2")
            .bind(active)
            .bind(store_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a product and returns its id.
    pub async fn insert_product(&self, product: &NewProduct) -> DbResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (company_id, sku, qr_code, barcode, name, price, cost, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
            RETURNING id
            "#,
        )
        .bind(product.company_id)
        .bind(&product.sku)
        .bind(&product.qr_code)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.cost)
        .fetch_one(&self.pool)
        .await?;

        debug!(id, sku = %product.sku, "Inserted product");
        Ok(id)
    }

    /// Activates or deactivates a product.
    pub async fn set_product_active(&self, product_id: i64, active: bool) -> DbResult<()> {
        sqlx::query("UPDATE products SET is_active = ?1 WHERE id = ?2")
            .bind(active)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts a payment method and returns its id.
    pub async fn insert_payment_method(
        &self,
        company_id: i64,
        code: &str,
        name: &str,
    ) -> DbResult<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO payment_methods (company_id, code, name) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(company_id)
        .bind(code)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
