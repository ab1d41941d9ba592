//! # Repository Module
//!
//! SQL for Harbor POS, one module per concern.
//!
//! ## Two Kinds of Access
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Inside a unit of work             Outside (reads, onboarding)         │
//! │  ─────────────────────             ───────────────────────────         │
//! │  free functions taking             *Repository structs holding         │
//! │  &mut SqliteConnection             a SqlitePool                        │
//! │                                                                         │
//! │  inventory::debit / overwrite      InventoryRepository                 │
//! │  inventory::append                 CatalogRepository                   │
//! │  catalog::find_active_product      AuditRepository                     │
//! │  audit::append                     ReportRepository                    │
//! │                                                                         │
//! │  The caller's transaction is the only way to reach the mutating        │
//! │  ledger functions.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod catalog;
pub mod inventory;
pub mod report;
