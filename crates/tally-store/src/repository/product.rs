//! # Product Repository
//!
//! In-memory catalog of products.
//!
//! ## Key Operations
//! - CRUD operations with validation on every write
//! - Case-insensitive name search
//! - `CatalogLookup` for the pricing engine
//!
//! ## Sharing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Catalog, Many Handles                            │
//! │                                                                         │
//! │  PosSystem.products ──┐                                                 │
//! │                       ├──► Arc<RwLock<BTreeMap<id, Product>>>           │
//! │  Checkout.catalog ────┘                                                 │
//! │                                                                         │
//! │  A price edit through either handle is what the next total() reads.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tally_core::validation::validate_new_product;
use tally_core::{CatalogLookup, NewProduct, Product, ProductUpdate};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;

/// Repository for products.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new();
///
/// let soup = repo.add(NewProduct { name: "Soup".into(), price: Money::new(1.89), is_weighted: false })?;
/// let found = repo.get(&soup.id);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProductRepository {
    products: Arc<RwLock<BTreeMap<String, Product>>>,
}

impl ProductRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Product>> {
        self.products.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Product>> {
        self.products
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Creates a product.
    ///
    /// ## Validation
    /// - name non-empty after trimming
    /// - price finite and >= 0
    ///
    /// Assigns a UUID v4 id and stamps `created_at`.
    pub fn add(&self, new: NewProduct) -> StoreResult<Product> {
        validate_new_product(&new)?;

        let product = Product {
            id: generate_product_id(),
            name: new.name,
            price: new.price,
            is_weighted: new.is_weighted,
            created_at: Utc::now(),
            updated_at: None,
        };

        debug!(id = %product.id, name = %product.name, price = %product.price, "Adding product");
        self.write().insert(product.id.clone(), product.clone());
        Ok(product)
    }

    /// Gets a product by its ID.
    pub fn get(&self, id: &str) -> Option<Product> {
        self.read().get(id).cloned()
    }

    /// All products, ordered by id.
    pub fn all(&self) -> Vec<Product> {
        self.read().values().cloned().collect()
    }

    /// Number of products.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - the updated product
    /// * `Ok(None)` - no product with this id
    /// * `Err(Validation)` - the merged product is invalid; nothing changed
    pub fn update(&self, id: &str, update: ProductUpdate) -> StoreResult<Option<Product>> {
        let mut products = self.write();
        let Some(existing) = products.get(id) else {
            return Ok(None);
        };

        let merged = NewProduct {
            name: update.name.unwrap_or_else(|| existing.name.clone()),
            price: update.price.unwrap_or(existing.price),
            is_weighted: update.is_weighted.unwrap_or(existing.is_weighted),
        };
        validate_new_product(&merged)?;

        let product = Product {
            id: existing.id.clone(),
            name: merged.name,
            price: merged.price,
            is_weighted: merged.is_weighted,
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
        };

        debug!(id = %id, price = %product.price, is_weighted = product.is_weighted, "Updated product");
        products.insert(id.to_string(), product.clone());
        Ok(Some(product))
    }

    /// Deletes a product. Returns false if it did not exist.
    ///
    /// Rules referencing the product are kept; a cart that already holds
    /// the product prices it at zero from then on.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.write().remove(id).is_some();
        debug!(id = %id, removed, "Deleted product");
        removed
    }

    /// Products whose name contains `fragment`, ignoring case.
    pub fn find_by_name(&self, fragment: &str) -> Vec<Product> {
        let needle = fragment.trim().to_lowercase();
        self.read()
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

impl CatalogLookup for ProductRepository {
    fn get_product(&self, id: &str) -> Option<Product> {
        self.get(id)
    }
}

/// Generates a new product ID (UUID v4).
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
