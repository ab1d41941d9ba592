//! # Order Service
//!
//! Creates a paid order in one unit of work.
//!
//! ## Order Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_order                                                           │
//! │                                                                         │
//! │  1. validate lines                      ItemsRequired / InvalidItem    │
//! │  2. BEGIN                                                               │
//! │  3. INSERT orders (created, zero totals)  retry on order_no collision  │
//! │  4. for each line, in order:                                           │
//! │       product lookup                    ProductNotFound(id)            │
//! │       INSERT order_items (price/cost snapshot)                         │
//! │       ledger debit                      InsufficientStock(id)          │
//! │       ledger append (sale, −qty)                                       │
//! │  5. UPDATE orders totals, status = paid                                │
//! │  6. payment method lookup               PaymentMethodNotFound          │
//! │     INSERT payments                                                     │
//! │  7. audit append (create_order)                                        │
//! │  8. COMMIT  (any error in 3..7 → ROLLBACK, nothing persisted)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult, ServiceResult};
use crate::repository::{audit, catalog, inventory};
use crate::service::{finish, ServiceConfig};
use harbor_core::validation::validate_order_lines;
use harbor_core::{
    CoreError, CreateOrder, Money, NewAuditEntry, NewInventoryTransaction, Order, OrderItem,
    OrderReceipt, OrderStatus, Payment, ORDER_PREFIX,
};

/// Order transaction manager.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
    config: ServiceConfig,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(pool: SqlitePool, config: ServiceConfig) -> Self {
        OrderService { pool, config }
    }

    /// Creates, prices, pays and audits an order atomically.
    ///
    /// Either every row (order, items, ledger debits and entries, payment,
    /// audit) is committed, or none is.
    pub async fn create_order(&self, request: CreateOrder) -> ServiceResult<OrderReceipt> {
        validate_order_lines(&request.items)?;

        let mut tx = self.pool.begin().await?;
        let outcome = self.run(&mut tx, &request).await;

        if let Err(err) = &outcome {
            warn!(
                store_id = request.store_id,
                error = %err,
                "Order rolled back"
            );
        }

        let receipt = finish(tx, outcome).await?;

        info!(
            order_id = receipt.order_id,
            order_no = %receipt.order_no,
            store_id = request.store_id,
            total = %receipt.total,
            lines = request.items.len(),
            "Order created"
        );
        Ok(receipt)
    }

    async fn run(
        &self,
        conn: &mut SqliteConnection,
        request: &CreateOrder,
    ) -> ServiceResult<OrderReceipt> {
        let business_date = Local::now().date_naive();
        let (order_id, order_no) = self.insert_order(conn, request, business_date).await?;

        let mut subtotal = Money::zero();

        for (idx, line) in request.items.iter().enumerate() {
            let product = catalog::find_active_product(conn, request.company_id, line.product_id)
                .await?
                .ok_or(CoreError::ProductNotFound(line.product_id))?;

            let line_total = product.price.multiply_quantity(line.qty);
            subtotal += line_total;

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    company_id, order_id, line_no, product_id, qty,
                    unit_cost, unit_price, line_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(request.company_id)
            .bind(order_id)
            .bind((idx + 1) as i64)
            .bind(line.product_id)
            .bind(line.qty)
            .bind(product.cost)
            .bind(product.price)
            .bind(line_total)
            .execute(&mut *conn)
            .await?;

            inventory::debit(conn, request.store_id, line.product_id, line.qty).await?;
            inventory::append(
                conn,
                &NewInventoryTransaction::sale(
                    request.company_id,
                    request.store_id,
                    line.product_id,
                    order_id,
                    line.qty,
                    request.cashier_id,
                ),
            )
            .await?;
        }

        let total = subtotal;
        let paid = request.payment_amount.unwrap_or(total);

        sqlx::query(
            r#"
            UPDATE orders
            SET subtotal_amount = ?1, total_amount = ?2, paid_amount = ?3, status = ?4
            WHERE id = ?5
            "#,
        )
        .bind(subtotal)
        .bind(total)
        .bind(paid)
        .bind(OrderStatus::Paid)
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

        let method =
            catalog::find_payment_method(conn, request.company_id, &request.payment_method_code)
                .await?
                .ok_or_else(|| {
                    CoreError::PaymentMethodNotFound(request.payment_method_code.clone())
                })?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                company_id, store_id, order_id, payment_method_id,
                amount, provider_status, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'paid', ?6)
            "#,
        )
        .bind(request.company_id)
        .bind(request.store_id)
        .bind(order_id)
        .bind(method.id)
        .bind(paid)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        audit::append(
            conn,
            &NewAuditEntry::order_created(
                request.company_id,
                request.store_id,
                request.cashier_id,
                order_id,
                &order_no,
                total,
            ),
        )
        .await?;

        Ok(OrderReceipt {
            order_id,
            order_no,
            total,
        })
    }

    /// Inserts the order header, drawing a new number on collision.
    async fn insert_order(
        &self,
        conn: &mut SqliteConnection,
        request: &CreateOrder,
        business_date: NaiveDate,
    ) -> ServiceResult<(i64, String)> {
        for attempt in 1..=self.config.number_attempts {
            let order_no = self.config.numbers.next_number(ORDER_PREFIX);

            let inserted: Result<i64, sqlx::Error> = sqlx::query_scalar(
                r#"
                INSERT INTO orders (
                    company_id, store_id, order_no, cashier_user_id,
                    subtotal_amount, total_amount, paid_amount,
                    business_date, status, created_at
                ) VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5, ?6, ?7)
                RETURNING id
                "#,
            )
            .bind(request.company_id)
            .bind(request.store_id)
            .bind(&order_no)
            .bind(request.cashier_id)
            .bind(business_date)
            .bind(OrderStatus::Created)
            .bind(Utc::now())
            .fetch_one(&mut *conn)
            .await;

            match inserted.map_err(DbError::from) {
                Ok(order_id) => {
                    debug!(order_id, order_no = %order_no, attempt, "Inserted order header");
                    return Ok((order_id, order_no));
                }
                Err(err) if err.is_unique_violation_on("order_no") => {
                    warn!(order_no = %order_no, attempt, "Order number taken, drawing another");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(CoreError::DocumentNumberExhausted {
            prefix: ORDER_PREFIX,
            attempts: self.config.number_attempts,
        }
        .into())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Gets an order by ID.
    pub async fn get(&self, order_id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, company_id, store_id, order_no, cashier_user_id,
                   subtotal_amount, total_amount, paid_amount,
                   business_date, status, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lines of an order by line number.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, line_no, product_id, qty, unit_cost, unit_price, line_total
            FROM order_items
            WHERE order_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// The payment of an order.
    pub async fn payment(&self, order_id: i64) -> DbResult<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, payment_method_id, amount, provider_status, paid_at
            FROM payments
            WHERE order_id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Number of orders in a store.
    pub async fn count_for_store(&self, store_id: i64) -> DbResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE store_id = ?1")
            .bind(store_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
