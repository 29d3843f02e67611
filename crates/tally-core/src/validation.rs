//! # Validation Module
//!
//! Rules for create and update requests on products, markdowns and
//! promotions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Types: u32 quantities, tagged promotion variants                  │
//! │  └── Unknown promotion `type` rejected                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by the store on add/update)              │
//! │  ├── Names non-empty, amounts non-negative                             │
//! │  ├── Percentages within 0..=100                                        │
//! │  └── Validity window ends after it starts                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing engine                                               │
//! │  └── Trusts stored rules; only checks the scan weight contract         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_percentage, validate_product_name};
//!
//! assert!(validate_product_name("Tomato Soup").is_ok());
//! assert!(validate_percentage(120.0, "discountPercent").is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewMarkdown, NewProduct, NewPromotion, PromotionKind};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Ground Beef").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    Ok(())
}

/// Validates an id reference such as `productId`.
pub fn validate_id(id: &str, field: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates an amount that may be zero but never negative.
///
/// ## Rules
/// - Zero is allowed (free item, zero-value markdown)
/// - NaN and infinities are rejected
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative(Money::new(0.0), "price").is_ok());
/// assert!(validate_non_negative(Money::new(-1.0), "price").is_err());
/// ```
pub fn validate_non_negative(amount: Money, field: &str) -> ValidationResult<()> {
    let value = amount.amount();
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

/// Validates a value that must be strictly greater than zero.
pub fn validate_positive(value: f64, field: &str) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

/// Validates a count that must be at least one.
pub fn validate_positive_count(value: u32, field: &str) -> ValidationResult<()> {
    validate_positive(f64::from(value), field)
}

/// Validates a percentage.
///
/// ## Rules
/// - Must be between 0 and 100 inclusive
pub fn validate_percentage(value: f64, field: &str) -> ValidationResult<()> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
            value,
        });
    }

    Ok(())
}

/// Validates that a validity window ends strictly after it starts.
pub fn validate_date_range(
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
) -> ValidationResult<()> {
    if valid_from >= valid_to {
        return Err(ValidationError::InvalidDateRange);
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a product create request (or a merged update).
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_non_negative(product.price, "price")?;
    Ok(())
}

/// Validates a markdown create request.
///
/// ## Rules
/// - `productId` non-empty
/// - `discountAmount` >= 0
/// - `validFrom` < `validTo`
pub fn validate_new_markdown(markdown: &NewMarkdown) -> ValidationResult<()> {
    validate_id(&markdown.product_id, "productId")?;
    validate_non_negative(markdown.discount_amount, "discountAmount")?;
    validate_date_range(markdown.valid_from, markdown.valid_to)?;
    Ok(())
}

/// Validates a promotion create request.
///
/// ## Rules per Variant
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────────────┐
/// │ common       │ productId non-empty, window ordered,                 │
/// │              │ maxApplications > 0 when present                    │
/// │ BuyNGetMOff  │ buyQuantity > 0, getQuantity > 0, 0 <= percent <= 100│
/// │ NForX        │ quantity > 0, price >= 0                             │
/// │ Weighted     │ buyWeight > 0, getWeight > 0, 0 <= percent <= 100    │
/// └──────────────┴──────────────────────────────────────────────────────┘
/// ```
pub fn validate_new_promotion(promotion: &NewPromotion) -> ValidationResult<()> {
    validate_id(&promotion.product_id, "productId")?;

    if let Some(max) = promotion.max_applications {
        validate_positive_count(max, "maxApplications")?;
    }

    match &promotion.kind {
        PromotionKind::BuyNGetMOff {
            buy_quantity,
            get_quantity,
            discount_percent,
        } => {
            validate_positive_count(*buy_quantity, "buyQuantity")?;
            validate_positive_count(*get_quantity, "getQuantity")?;
            validate_percentage(*discount_percent, "discountPercent")?;
        }
        PromotionKind::NForX { quantity, price } => {
            validate_positive_count(*quantity, "quantity")?;
            validate_non_negative(*price, "price")?;
        }
        PromotionKind::Weighted {
            buy_weight,
            get_weight,
            discount_percent,
        } => {
            validate_positive(*buy_weight, "buyWeight")?;
            validate_positive(*get_weight, "getWeight")?;
            validate_percentage(*discount_percent, "discountPercent")?;
        }
    }

    validate_date_range(promotion.valid_from, promotion.valid_to)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
