//! # Store Error Types
//!
//! Error types for repository, configuration and seed operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (tally-core)    CheckoutError (tally-core)            │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  StoreError (this module) ◄─────────────┘                               │
//! │       ▲                                                                 │
//! │       │  std::io::Error, toml::de::Error, toml::ser::Error             │
//! │       │                                                                 │
//! │  checkout-demo prints the message and exits non-zero                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_core::{CheckoutError, ValidationError};
use thiserror::Error;

/// Store, configuration and seed errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    ///
    /// ## When This Occurs
    /// - Seed file references an unknown product key
    /// - Update or deactivate of an unknown id where the caller asked for
    ///   an error instead of `None`/`false`
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A create or update request was rejected.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config or seed file is not valid TOML for its schema.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be written as TOML.
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config parsed but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Scanning a seeded basket failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::not_found("Product", "soup");
        assert_eq!(err.to_string(), "Product not found: soup");

        let err: StoreError = CheckoutError::ProductNotFound("x".into()).into();
        assert_eq!(err.to_string(), "Product not found: x");

        let err: StoreError = ValidationError::InvalidDateRange.into();
        assert!(err.to_string().starts_with("Validation failed"));
    }
}
