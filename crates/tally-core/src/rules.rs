//! # Collaborator Traits
//!
//! The pricing engine never owns storage. It reads products and rules
//! through these two traits, so an in-memory store and a persistent backend
//! are interchangeable.
//!
//! ```text
//! ┌────────────────────┐    get_product(id)           ┌──────────────────┐
//! │                    │ ───────────────────────────► │  CatalogLookup   │
//! │     Checkout       │                              └──────────────────┘
//! │  (pricing engine)  │    active_markdowns(id, now) ┌──────────────────┐
//! │                    │ ───────────────────────────► │    RuleStore     │
//! │                    │    active_promotions(id, now)│                  │
//! └────────────────────┘ ───────────────────────────► └──────────────────┘
//! ```
//!
//! Lookups are synchronous in-process calls and cannot fail; an unknown id
//! is simply `None` or an empty list.

use chrono::{DateTime, Utc};

use crate::types::{Markdown, Product, Promotion};

/// Answers "product by id".
pub trait CatalogLookup {
    /// Returns the current state of the product, or `None` if unknown.
    fn get_product(&self, id: &str) -> Option<Product>;
}

/// Answers "active rules for product X at time T".
///
/// Implementations filter with `is_active && valid_from <= now < valid_to`
/// and return rules in insertion order.
pub trait RuleStore {
    /// Active markdowns for `product_id` at `now`.
    fn active_markdowns(&self, product_id: &str, now: DateTime<Utc>) -> Vec<Markdown>;

    /// Active promotions for `product_id` at `now`.
    fn active_promotions(&self, product_id: &str, now: DateTime<Utc>) -> Vec<Promotion>;
}

impl<T: CatalogLookup + ?Sized> CatalogLookup for &T {
    fn get_product(&self, id: &str) -> Option<Product> {
        (**self).get_product(id)
    }
}

impl<T: RuleStore + ?Sized> RuleStore for &T {
    fn active_markdowns(&self, product_id: &str, now: DateTime<Utc>) -> Vec<Markdown> {
        (**self).active_markdowns(product_id, now)
    }

    fn active_promotions(&self, product_id: &str, now: DateTime<Utc>) -> Vec<Promotion> {
        (**self).active_promotions(product_id, now)
    }
}
