//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  kasir-server errors                                                   │
//! │  └── ApiError         - What the browser sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Browser      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries the context needed for a precise user-facing
//! message (product id, available vs. required amounts).

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Not enough physical stock to complete a sale or an outbound movement.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line: Indomie × 150
    ///      │
    ///      ▼
    /// Check stock: available = 100
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Indomie", available: 100, required: 150 }
    ///      │
    ///      ▼
    /// Nothing is written; the cashier sees "only 100 in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, required {required}")]
    InsufficientStock {
        product: String,
        available: i64,
        required: i64,
    },

    /// Not enough digital balance (e.g. e-wallet float) for a digital sale.
    #[error("Insufficient digital balance for {product}: available {available}, required {required}")]
    InsufficientBalance {
        product: String,
        available: Money,
        required: Money,
    },

    /// Cash received does not cover the transaction total.
    #[error("Insufficient payment: received {received}, total {total}")]
    InsufficientPayment { received: Money, total: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic or I/O runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. malformed date or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Combination of values is not allowed.
    #[error("{field}: {reason}")]
    NotAllowed { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_not_be_negative(field: &str) -> Self {
        ValidationError::MustNotBeNegative {
            field: field.to_string(),
        }
    }

    pub(crate) fn too_large(field: &str, reason: &str) -> Self {
        ValidationError::NotAllowed {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
