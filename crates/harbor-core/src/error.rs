//! # Error Types
//!
//! Domain-specific error types for harbor-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  harbor-core errors (this file)                                        │
//! │  ├── CoreError        - Domain failures inside a unit of work          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  harbor-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError from a transaction         │
//! │                                                                         │
//! │  hq-api errors (in app)                                                │
//! │  └── ApiError         - What terminals see ({ok:false, error:CODE})    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Codes
//! Every [`CoreError`] has a stable machine-readable code (see
//! [`CoreError::code`]). Codes for state conflicts embed the offending
//! product id, e.g. `INSUFFICIENT_STOCK:42`.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Validation variants are raised before anything is persisted. All other
/// variants abort the enclosing unit of work, which is then rolled back.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An order or stocktake was submitted with no lines.
    #[error("At least one item is required")]
    ItemsRequired,

    /// A line failed validation (non-positive id, bad quantity).
    ///
    /// `line` is 1-based, matching the order line numbers.
    #[error("Invalid item at line {line}: {reason}")]
    InvalidItem { line: usize, reason: ValidationError },

    /// Product does not exist, belongs to another company, or is inactive.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// The conditional debit matched no row.
    ///
    /// ## User Workflow
    /// ```text
    /// Terminal sells 3 × product 42
    ///      │
    ///      ▼
    /// UPDATE store_inventory SET qty = qty - 3 WHERE … AND qty >= 3
    ///      │
    ///      ▼  0 rows affected
    /// InsufficientStock(42) → whole order rolled back
    /// ```
    #[error("Insufficient stock for product {0}")]
    InsufficientStock(i64),

    /// No payment method with this code for the company.
    #[error("Payment method not found: {0}")]
    PaymentMethodNotFound(String),

    /// The store/product pair was never initialized in store inventory.
    #[error("Inventory record not found for product {0}")]
    InventoryRecordNotFound(i64),

    /// Sync upload without a source store or idempotency key.
    #[error("Source store and idempotency key are required")]
    IdempotencyKeyRequired,

    /// Every generated order/check number collided with an existing one.
    #[error("Could not allocate a unique {prefix} number after {attempts} attempts")]
    DocumentNumberExhausted { prefix: &'static str, attempts: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Machine-readable code sent to terminals in the `error` field.
    pub fn code(&self) -> String {
        match self {
            CoreError::ItemsRequired => "ITEMS_REQUIRED".to_string(),
            CoreError::InvalidItem { .. } => "INVALID_ITEM".to_string(),
            CoreError::ProductNotFound(id) => format!("PRODUCT_NOT_FOUND:{}", id),
            CoreError::InsufficientStock(id) => format!("INSUFFICIENT_STOCK:{}", id),
            CoreError::PaymentMethodNotFound(_) => "PAYMENT_METHOD_NOT_FOUND".to_string(),
            CoreError::InventoryRecordNotFound(id) => format!("INVENTORY_NOT_FOUND:{}", id),
            CoreError::IdempotencyKeyRequired => {
                "source_store_id_and_idempotency_key_required".to_string()
            }
            CoreError::DocumentNumberExhausted { .. } => "DOCUMENT_NUMBER_CONFLICT".to_string(),
            CoreError::Validation(_) => "VALIDATION_ERROR".to_string(),
        }
    }

    /// True for errors raised before any persistence (HTTP 422).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::ItemsRequired
                | CoreError::InvalidItem { .. }
                | CoreError::IdempotencyKeyRequired
                | CoreError::Validation(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// Used for early validation before a unit of work is opened.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_codes_embed_product_id() {
        assert_eq!(CoreError::InsufficientStock(42).code(), "INSUFFICIENT_STOCK:42");
        assert_eq!(CoreError::ProductNotFound(7).code(), "PRODUCT_NOT_FOUND:7");
        assert_eq!(
            CoreError::InventoryRecordNotFound(9).code(),
            "INVENTORY_NOT_FOUND:9"
        );
        assert_eq!(
            CoreError::PaymentMethodNotFound("QR".to_string()).code(),
            "PAYMENT_METHOD_NOT_FOUND"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(CoreError::ItemsRequired.is_validation());
        assert!(CoreError::IdempotencyKeyRequired.is_validation());
        assert!(CoreError::InvalidItem {
            line: 1,
            reason: ValidationError::MustBePositive {
                field: "qty".to_string()
            },
        }
        .is_validation());

        assert!(!CoreError::InsufficientStock(1).is_validation());
        assert!(!CoreError::PaymentMethodNotFound("CASH".to_string()).is_validation());
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidItem {
            line: 2,
            reason: ValidationError::MustBePositive {
                field: "qty".to_string(),
            },
        };
        assert_eq!(err.to_string(), "Invalid item at line 2: qty must be positive");

        let err = CoreError::DocumentNumberExhausted {
            prefix: "SO",
            attempts: 5,
        };
        assert_eq!(
            err.to_string(),
            "Could not allocate a unique SO number after 5 attempts"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "qty".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
