//! # harbor-db: Database Layer for Harbor POS
//!
//! SQLite storage, the inventory ledger and the three transactional units
//! of work (orders, stocktakes, branch uploads).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Harbor POS Data Flow                             │
//! │                                                                         │
//! │  hq-api handler (POST /api/orders)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     harbor-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Database    │  │   │
//! │  │   │  (service/)   │───►│ (repository/) │    │  (pool.rs)   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ OrderService  │    │ inventory     │    │ SqlitePool   │  │   │
//! │  │   │ Stocktake     │    │ catalog       │    │ WAL, busy    │  │   │
//! │  │   │ SyncIngestor  │    │ audit, report │    │ migrations   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./data/harbor.db)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Ledger, catalog, audit and report SQL
//! - [`service`] - Order, stocktake and sync units of work
//!
//! ## Usage
//!
//! ```rust,ignore
//! use harbor_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/harbor.db")).await?;
//!
//! let receipt = db.orders().create_order(request).await?;
//! let on_hand = db.inventory().quantity_on_hand(store_id, product_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};

pub use repository::audit::AuditRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::report::{DateRange, ReportRepository};
pub use service::{OrderService, ServiceConfig, StocktakeService, SyncIngestor};
