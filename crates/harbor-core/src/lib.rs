//! # harbor-core: Transaction Rules for Harbor POS
//!
//! Domain types and rules for the head-office backend. Everything here is
//! pure: the database layer calls into this crate, never the other way round.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Harbor POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Store terminals / HQ dashboard (HTTP JSON)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    hq-api (axum routes)                         │   │
//! │  │    /api/orders, /api/inventory/check, /api/sync/upload, ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    harbor-db (services + ledger)                │   │
//! │  │    OrderService, StocktakeService, SyncIngestor, reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ harbor-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ numbering │  │ validation│  │   │
//! │  │   │  Order    │  │   Money   │  │  SO…/CHK… │  │   rules   │  │   │
//! │  │   │  Ledger   │  │  epsilon  │  │  suffixes │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, InventoryTransaction, SyncUploadRecord, etc.)
//! - [`money`] - Money type and quantity tolerance
//! - [`numbering`] - Order and inventory check numbers
//! - [`error`] - Domain error types with wire codes
//! - [`validation`] - Request validation
//!
//! ## Example Usage
//!
//! ```rust
//! use harbor_core::money::Money;
//! use harbor_core::types::OrderLineRequest;
//! use harbor_core::validation::validate_order_lines;
//!
//! let lines = [OrderLineRequest { product_id: 1, qty: 3.0 }];
//! validate_order_lines(&lines).unwrap();
//!
//! let total = Money::from_amount(2.5).multiply_quantity(lines[0].qty);
//! assert_eq!(total.to_string(), "7.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, QTY_EPSILON};
pub use numbering::{ClockNumbers, NumberSource, CHECK_PREFIX, ORDER_PREFIX};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Company used when a request omits `company_id`.
pub const DEFAULT_COMPANY_ID: i64 = 1;

/// Store used when a request omits `store_id`.
pub const DEFAULT_STORE_ID: i64 = 1;

/// Checker used when a stocktake omits `checked_by`.
pub const DEFAULT_CHECKER_ID: i64 = 1;

/// Tender used when an order omits the payment method.
pub const DEFAULT_PAYMENT_METHOD_CODE: &str = "CASH";

/// Sync type used when an upload omits it.
pub const DEFAULT_SYNC_TYPE: &str = "order_batch";

/// How many document numbers a unit of work tries before giving up.
pub const DEFAULT_NUMBER_ATTEMPTS: u32 = 5;

/// Row cap of the catalog listing.
pub const PRODUCT_LIST_LIMIT: i64 = 200;
