//! # Validation Module
//!
//! Request validation for the three write units of work.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (hq-api)                                        │
//! │  ├── JSON deserialization                                              │
//! │  └── Defaults (company 1, store 1, CASH, order_batch)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Non-empty item lists                                              │
//! │  ├── Positive ids, positive / non-negative finite quantities          │
//! │  └── Idempotency key presence                                          │
//! │           │   nothing has been written yet                              │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE order_no / check_no / idempotency_key                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use harbor_core::types::OrderLineRequest;
//! use harbor_core::validation::validate_order_lines;
//!
//! let lines = vec![OrderLineRequest { product_id: 42, qty: 2.0 }];
//! assert!(validate_order_lines(&lines).is_ok());
//! assert!(validate_order_lines(&[]).is_err());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CountLineRequest, OrderLineRequest};

/// Result type for field-level validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted idempotency key.
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 128;

/// Longest accepted sync type.
pub const MAX_SYNC_TYPE_LEN: usize = 50;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates an entity id (`> 0`).
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a sold quantity.
///
/// ## Rules
/// - Must be a finite number
/// - Must be positive (> 0); fractional quantities are allowed
///
/// ## Example
/// ```rust
/// use harbor_core::validation::validate_sale_quantity;
///
/// assert!(validate_sale_quantity(0.5).is_ok());
/// assert!(validate_sale_quantity(0.0).is_err());
/// assert!(validate_sale_quantity(f64::NAN).is_err());
/// ```
pub fn validate_sale_quantity(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "qty".to_string(),
        });
    }

    if qty <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "qty".to_string(),
        });
    }

    Ok(())
}

/// Validates a counted quantity. Zero is a legitimate count.
pub fn validate_counted_quantity(counted: f64) -> ValidationResult<()> {
    if !counted.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "counted_qty".to_string(),
        });
    }

    if counted < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "counted_qty".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates the lines of a new order.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Terminal: POST /api/orders                                             │
/// │                                                                         │
/// │  items: [{product_id: 42, qty: 2}, {product_id: 0, qty: 1}]            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_order_lines ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── empty?            → ItemsRequired                             │
/// │       ├── line 2 id <= 0    → InvalidItem { line: 2, .. }               │
/// │       └── OK → open the unit of work                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_order_lines(lines: &[OrderLineRequest]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::ItemsRequired);
    }

    for (idx, line) in lines.iter().enumerate() {
        validate_id("product_id", line.product_id)
            .and_then(|_| validate_sale_quantity(line.qty))
            .map_err(|reason| CoreError::InvalidItem {
                line: idx + 1,
                reason,
            })?;
    }

    Ok(())
}

/// Validates the lines of a stocktake.
pub fn validate_count_lines(lines: &[CountLineRequest]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::ItemsRequired);
    }

    for (idx, line) in lines.iter().enumerate() {
        validate_id("product_id", line.product_id)
            .and_then(|_| validate_counted_quantity(line.counted_qty))
            .map_err(|reason| CoreError::InvalidItem {
                line: idx + 1,
                reason,
            })?;
    }

    Ok(())
}

/// Validates a sync upload's identity and returns the trimmed key.
///
/// A missing store or blank key is `IdempotencyKeyRequired`; an oversized key
/// or sync type is a plain validation error.
pub fn validate_sync_upload(
    source_store_id: i64,
    sync_type: &str,
    idempotency_key: &str,
) -> CoreResult<String> {
    let key = idempotency_key.trim();

    if source_store_id <= 0 || key.is_empty() {
        return Err(CoreError::IdempotencyKeyRequired);
    }

    if key.chars().count() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(ValidationError::TooLong {
            field: "idempotency_key".to_string(),
            max: MAX_IDEMPOTENCY_KEY_LEN,
        }
        .into());
    }

    if sync_type.chars().count() > MAX_SYNC_TYPE_LEN {
        return Err(ValidationError::TooLong {
            field: "sync_type".to_string(),
            max: MAX_SYNC_TYPE_LEN,
        }
        .into());
    }

    Ok(key.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
