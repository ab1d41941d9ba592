//! # Domain Types
//!
//! Core domain types used throughout Harbor POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  StoreInventory │   │ InventoryTxn    │       │
//! │  │  (reference)    │   │  (store,product)│   │ (append-only)   │       │
//! │  │  price, cost    │   │  qty_on_hand    │   │ qty_change      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │ InventoryCheck  │   │ SyncUpload      │       │
//! │  │  ├ OrderItem*   │   │  ├ CheckItem*   │   │ idempotency_key │       │
//! │  │  └ Payment      │   │  status: done   │   │ received/dup    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │                 ┌─────────────────┐                                     │
//! │                 │   AuditEntry    │  written by all three units         │
//! │                 └─────────────────┘                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisted rows use integer ids assigned by the database. `New*` types are
//! the insert-side counterparts without the generated columns.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Status Enums
// =============================================================================

/// Cause of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TxnType {
    /// Debit by a paid order.
    Sale,
    /// Adjustment by an inventory check.
    Stocktake,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnType::Sale => "sale",
            TxnType::Stocktake => "stocktake",
        }
    }
}

/// Order lifecycle. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Row inserted, lines being added (never visible outside the unit).
    Created,
    /// Totals written and payment recorded.
    Paid,
}

/// Inventory check lifecycle. There is no draft state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Done,
}

/// Outcome of a sync upload delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// First delivery of this idempotency key; payload stored.
    Received,
    /// Repeat delivery; payload ignored, only the attempt time refreshed.
    Duplicate,
}

// =============================================================================
// Catalog (reference data)
// =============================================================================

/// A branch of the chain.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Store {
    pub id: i64,
    pub company_id: i64,
    pub store_code: String,
    pub store_name: String,
    /// Inactive stores are excluded from the HQ store count.
    pub is_active: bool,
}

/// A sellable product. Read-only from the core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub company_id: i64,
    pub sku: String,
    pub qr_code: Option<String>,
    pub barcode: Option<String>,
    pub name: String,
    /// Current selling price.
    #[ts(type = "string")]
    pub price: Money,
    /// Current unit cost (snapshotted on order lines for margin reports).
    #[ts(type = "string")]
    pub cost: Money,
    pub is_active: bool,
}

/// Insert-side product (seeding and onboarding).
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub company_id: i64,
    pub sku: String,
    pub qr_code: Option<String>,
    pub barcode: Option<String>,
    pub name: String,
    pub price: Money,
    pub cost: Money,
}

/// A product as seen by a terminal in one store: catalog fields plus stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StoreProduct {
    pub id: i64,
    pub sku: String,
    pub qr_code: Option<String>,
    pub barcode: Option<String>,
    pub name: String,
    #[ts(type = "string")]
    pub price: Money,
    /// 0 when the store has no inventory row for this product.
    pub qty_on_hand: f64,
}

/// A tender type configured for a company (`CASH`, `CARD`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethod {
    pub id: i64,
    pub company_id: i64,
    pub code: String,
    pub name: String,
}

// =============================================================================
// Inventory
// =============================================================================

/// Quantity-on-hand for one (store, product) pair.
///
/// Only the inventory ledger writes `qty_on_hand`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StoreInventory {
    pub company_id: i64,
    pub store_id: i64,
    pub product_id: i64,
    pub qty_on_hand: f64,
    /// Low-stock threshold for dashboards.
    pub safety_stock: f64,
}

/// An immutable ledger row explaining one quantity change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryTransaction {
    pub id: i64,
    pub company_id: i64,
    pub store_id: i64,
    pub product_id: i64,
    pub txn_type: TxnType,
    /// `order` or `inventory_check`.
    pub ref_type: String,
    pub ref_id: i64,
    /// Signed: negative for sales, counted − system for stocktakes.
    pub qty_change: f64,
    /// Resulting quantity; only recorded by stocktakes.
    pub qty_after: Option<f64>,
    pub reason: String,
    pub created_by: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Insert-side ledger entry.
///
/// Built through [`NewInventoryTransaction::sale`] and
/// [`NewInventoryTransaction::stocktake`] so the type/reference/reason triple
/// is always consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryTransaction {
    pub company_id: i64,
    pub store_id: i64,
    pub product_id: i64,
    pub txn_type: TxnType,
    pub ref_type: &'static str,
    pub ref_id: i64,
    pub qty_change: f64,
    pub qty_after: Option<f64>,
    pub reason: &'static str,
    pub created_by: Option<i64>,
}

impl NewInventoryTransaction {
    /// Ledger entry for a sale debit of `qty` units.
    pub fn sale(
        company_id: i64,
        store_id: i64,
        product_id: i64,
        order_id: i64,
        qty: f64,
        cashier_id: Option<i64>,
    ) -> Self {
        NewInventoryTransaction {
            company_id,
            store_id,
            product_id,
            txn_type: TxnType::Sale,
            ref_type: "order",
            ref_id: order_id,
            qty_change: -qty,
            qty_after: None,
            reason: "POS sale",
            created_by: cashier_id,
        }
    }

    /// Ledger entry for a stocktake adjustment of `diff` ending at `counted`.
    pub fn stocktake(
        company_id: i64,
        store_id: i64,
        product_id: i64,
        check_id: i64,
        diff: f64,
        counted: f64,
        checker_id: i64,
    ) -> Self {
        NewInventoryTransaction {
            company_id,
            store_id,
            product_id,
            txn_type: TxnType::Stocktake,
            ref_type: "inventory_check",
            ref_id: check_id,
            qty_change: diff,
            qty_after: Some(counted),
            reason: "Inventory check adjust",
            created_by: Some(checker_id),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A sales order. Immutable once `Paid`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub company_id: i64,
    pub store_id: i64,
    /// `SO` + YYYYMMDDHHMMSS + 3-digit suffix.
    pub order_no: String,
    pub cashier_user_id: Option<i64>,
    #[ts(type = "string")]
    pub subtotal_amount: Money,
    #[ts(type = "string")]
    pub total_amount: Money,
    #[ts(type = "string")]
    pub paid_amount: Money,
    #[ts(as = "String")]
    pub business_date: NaiveDate,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line of an order. Cost and price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// 1-based, in request order.
    pub line_no: i64,
    pub product_id: i64,
    pub qty: f64,
    #[ts(type = "string")]
    pub unit_cost: Money,
    #[ts(type = "string")]
    pub unit_price: Money,
    #[ts(type = "string")]
    pub line_total: Money,
}

/// The single payment of an order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub payment_method_id: i64,
    #[ts(type = "string")]
    pub amount: Money,
    pub provider_status: String,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    #[serde(default)]
    pub product_id: i64,
    #[serde(default)]
    pub qty: f64,
}

/// Input of the order transaction.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub company_id: i64,
    pub store_id: i64,
    pub cashier_id: Option<i64>,
    pub items: Vec<OrderLineRequest>,
    pub payment_method_code: String,
    /// Defaults to the order total.
    pub payment_amount: Option<Money>,
}

/// Result of a committed order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderReceipt {
    pub order_id: i64,
    pub order_no: String,
    #[ts(type = "string")]
    pub total: Money,
}

// =============================================================================
// Stocktake
// =============================================================================

/// A submitted stock count.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryCheck {
    pub id: i64,
    pub company_id: i64,
    pub store_id: i64,
    /// `CHK` + YYYYMMDDHHMMSS + 3-digit suffix.
    pub check_no: String,
    pub status: CheckStatus,
    pub checked_by: i64,
    #[ts(as = "String")]
    pub checked_at: DateTime<Utc>,
}

/// System vs counted quantity for one product of a check.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryCheckItem {
    pub id: i64,
    pub check_id: i64,
    pub product_id: i64,
    pub system_qty: f64,
    pub counted_qty: f64,
    /// counted − system
    pub diff_qty: f64,
}

/// One counted line of a stocktake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountLineRequest {
    #[serde(default)]
    pub product_id: i64,
    #[serde(default)]
    pub counted_qty: f64,
}

/// Input of the stocktake transaction.
#[derive(Debug, Clone)]
pub struct SubmitCheck {
    pub company_id: i64,
    pub store_id: i64,
    pub checker_id: i64,
    pub items: Vec<CountLineRequest>,
}

/// Result of a committed stocktake.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckReceipt {
    pub check_id: i64,
    pub check_no: String,
    /// Lines whose diff was large enough to produce a ledger entry.
    #[serde(skip)]
    pub adjusted_lines: usize,
}

// =============================================================================
// Branch Sync
// =============================================================================

/// A stored branch upload, keyed by its idempotency key.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SyncUploadRecord {
    pub id: i64,
    pub company_id: i64,
    pub source_store_id: i64,
    pub sync_type: String,
    pub idempotency_key: String,
    /// Raw JSON of the first delivery.
    pub payload_json: String,
    pub sync_status: SyncStatus,
    /// First received.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Last delivery attempt.
    #[ts(as = "String")]
    pub synced_at: DateTime<Utc>,
}

/// Input of a branch upload.
#[derive(Debug, Clone)]
pub struct SyncUpload {
    pub company_id: i64,
    pub source_store_id: i64,
    pub sync_type: String,
    pub idempotency_key: String,
    /// Serialized JSON payload.
    pub payload_json: String,
}

/// Result of a branch upload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SyncUploadOutcome {
    pub source_store_id: i64,
    pub idempotency_key: String,
    pub status: SyncStatus,
}

// =============================================================================
// Audit
// =============================================================================

/// A row of the append-only audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AuditEntry {
    pub id: i64,
    pub company_id: i64,
    pub store_id: i64,
    pub actor_type: String,
    pub actor_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub detail_json: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Insert-side audit entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub company_id: i64,
    pub store_id: i64,
    pub actor_id: Option<i64>,
    pub action: &'static str,
    pub entity_type: &'static str,
    pub entity_id: i64,
    pub detail: serde_json::Value,
}

impl NewAuditEntry {
    /// Audit entry of a committed order.
    pub fn order_created(
        company_id: i64,
        store_id: i64,
        cashier_id: Option<i64>,
        order_id: i64,
        order_no: &str,
        total: Money,
    ) -> Self {
        NewAuditEntry {
            company_id,
            store_id,
            actor_id: cashier_id,
            action: "create_order",
            entity_type: "order",
            entity_id: order_id,
            detail: serde_json::json!({ "order_no": order_no, "total": total }),
        }
    }

    /// Audit entry of a committed inventory check.
    pub fn check_submitted(
        company_id: i64,
        store_id: i64,
        checker_id: i64,
        check_id: i64,
        check_no: &str,
        item_count: usize,
    ) -> Self {
        NewAuditEntry {
            company_id,
            store_id,
            actor_id: Some(checker_id),
            action: "inventory_check",
            entity_type: "inventory_checks",
            entity_id: check_id,
            detail: serde_json::json!({ "check_no": check_no, "item_count": item_count }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_entry_is_negative_debit() {
        let entry = NewInventoryTransaction::sale(1, 1, 42, 100, 3.0, Some(9));
        assert_eq!(entry.txn_type, TxnType::Sale);
        assert_eq!(entry.ref_type, "order");
        assert_eq!(entry.ref_id, 100);
        assert_eq!(entry.qty_change, -3.0);
        assert_eq!(entry.qty_after, None);
        assert_eq!(entry.created_by, Some(9));
    }

    #[test]
    fn test_stocktake_entry_records_quantity_after() {
        let entry = NewInventoryTransaction::stocktake(1, 1, 42, 5, -3.0, 7.0, 2);
        assert_eq!(entry.txn_type, TxnType::Stocktake);
        assert_eq!(entry.ref_type, "inventory_check");
        assert_eq!(entry.qty_change, -3.0);
        assert_eq!(entry.qty_after, Some(7.0));
        assert_eq!(entry.reason, "Inventory check adjust");
    }

    #[test]
    fn test_order_audit_detail() {
        let entry =
            NewAuditEntry::order_created(1, 2, None, 10, "SO20260101120000123", Money::from_amount(9.0));
        assert_eq!(entry.action, "create_order");
        assert_eq!(entry.detail["order_no"], "SO20260101120000123");
        assert_eq!(entry.detail["total"], "9.00");
    }

    #[test]
    fn test_line_request_defaults_missing_fields_to_zero() {
        let line: OrderLineRequest = serde_json::from_str(r#"{"qty": 2}"#).unwrap();
        assert_eq!(line.product_id, 0);
        assert_eq!(line.qty, 2.0);
    }

    #[test]
    fn test_txn_type_wire_names() {
        assert_eq!(serde_json::to_string(&TxnType::Stocktake).unwrap(), "\"stocktake\"");
        assert_eq!(TxnType::Sale.as_str(), "sale");
        assert_eq!(serde_json::to_string(&SyncStatus::Duplicate).unwrap(), "\"duplicate\"");
    }
}
