//! # Shared Checkout
//!
//! A `Checkout` is single-owner: one cart, one session. When one engine is
//! handed to several callers (e.g. lanes on a shared terminal service) the
//! cart and cache must be guarded. `SharedCheckout` does that.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SharedCheckout (Clone)                                                 │
//! │       │                                                                 │
//! │       └── Arc<Mutex<Checkout<C, R>>>                                    │
//! │                                                                         │
//! │  with_checkout(|c| ...)      lock ─► read  ─► unlock                    │
//! │  with_checkout_mut(|c| ...)  lock ─► write ─► unlock                    │
//! │                                                                         │
//! │  total() needs &mut (it fills the cache), so it takes the lock too.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A Mutex rather than an RwLock: every pricing call may write the cache.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use crate::checkout::{Checkout, CheckoutConfig, Receipt};
use crate::error::CoreResult;
use crate::money::Money;
use crate::rules::{CatalogLookup, RuleStore};

/// Cloneable, mutex-guarded handle to one `Checkout`.
#[derive(Debug)]
pub struct SharedCheckout<C, R> {
    inner: Arc<Mutex<Checkout<C, R>>>,
}

impl<C, R> Clone for SharedCheckout<C, R> {
    fn clone(&self) -> Self {
        SharedCheckout {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: CatalogLookup, R: RuleStore> SharedCheckout<C, R> {
    /// Wraps an existing checkout.
    pub fn new(checkout: Checkout<C, R>) -> Self {
        SharedCheckout {
            inner: Arc::new(Mutex::new(checkout)),
        }
    }

    /// Builds a fresh checkout over the given stores.
    pub fn with_config(catalog: C, rules: R, config: CheckoutConfig) -> Self {
        Self::new(Checkout::with_config(catalog, rules, config))
    }

    /// A panic while holding the lock leaves the cart consistent (every
    /// mutation is a single push/remove/clear), so the poison flag is cleared.
    fn lock(&self) -> MutexGuard<'_, Checkout<C, R>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Checkout mutex poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Executes a function with read access to the checkout.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let lines = shared.with_checkout(|c| c.len());
    /// ```
    pub fn with_checkout<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Checkout<C, R>) -> T,
    {
        let checkout = self.lock();
        f(&checkout)
    }

    /// Executes a function with write access to the checkout.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// shared.with_checkout_mut(|c| c.scan("soup", None))?;
    /// ```
    pub fn with_checkout_mut<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Checkout<C, R>) -> T,
    {
        let mut checkout = self.lock();
        f(&mut checkout)
    }

    pub fn scan(&self, product_id: &str, weight: Option<f64>) -> CoreResult<Money> {
        self.with_checkout_mut(|c| c.scan(product_id, weight))
    }

    pub fn remove(&self, product_id: &str, weight: Option<f64>) -> bool {
        self.with_checkout_mut(|c| c.remove(product_id, weight))
    }

    pub fn reset(&self) {
        self.with_checkout_mut(|c| c.reset())
    }

    pub fn total(&self) -> Money {
        self.with_checkout_mut(|c| c.total())
    }

    pub fn breakdown(&self) -> Receipt {
        self.with_checkout_mut(|c| c.breakdown())
    }
}
