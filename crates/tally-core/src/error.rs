//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CheckoutError    - Scan contract violations                       │
//! │  └── ValidationError  - Rejected create/update requests                │
//! │                                                                         │
//! │  tally-store errors (separate crate)                                   │
//! │  └── StoreError       - Repository, config and seed failures           │
//! │                                                                         │
//! │  Flow: ValidationError ──► StoreError ◄── CheckoutError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, field, value)
//! 3. Errors are enum variants, never String
//! 4. A failed operation leaves the cart exactly as it was

use thiserror::Error;

// =============================================================================
// Checkout Error
// =============================================================================

/// Errors raised by the pricing engine.
///
/// Only `scan` can fail. `total`, `remove` and `reset` never return errors:
/// a product deleted after scanning simply contributes nothing to the total.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The scanned product id is unknown to the catalog.
    ///
    /// ## When This Occurs
    /// - Barcode maps to an id that was never created
    /// - Product was deleted before it was scanned
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A weighted product was scanned without a weight.
    #[error("Weight required for weighted product: {product_id}")]
    WeightRequired { product_id: String },

    /// A unit product was scanned with a weight.
    #[error("Weight not allowed for non-weighted product: {product_id}")]
    WeightNotAllowed { product_id: String },

    /// A weighted product was scanned with a weight that is zero, negative,
    /// or not a finite number.
    #[error("Invalid weight {weight} for product {product_id}")]
    InvalidWeight { product_id: String, weight: f64 },
}

impl CheckoutError {
    /// Returns true for every weight contract violation.
    ///
    /// ```text
    /// WeightRequired ──┐
    /// WeightNotAllowed ├──► is_invalid_weight() == true
    /// InvalidWeight ───┘
    /// ```
    pub fn is_invalid_weight(&self) -> bool {
        matches!(
            self,
            CheckoutError::WeightRequired { .. }
                | CheckoutError::WeightNotAllowed { .. }
                | CheckoutError::InvalidWeight { .. }
        )
    }

    /// Returns true when the referenced product does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CheckoutError::ProductNotFound(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the [`crate::validation`] rules when a product, markdown or
/// promotion is created or updated. The pricing engine itself never
/// produces one.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative (got {value})")]
    Negative { field: String, value: f64 },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive (got {value})")]
    MustBePositive { field: String, value: f64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Validity window does not end after it starts.
    #[error("validTo must be after validFrom")]
    InvalidDateRange,
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Negative { field, .. }
            | ValidationError::MustBePositive { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
            ValidationError::InvalidDateRange => "validTo",
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CheckoutError.
pub type CoreResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================
