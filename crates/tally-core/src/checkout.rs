//! # Checkout (Pricing Engine)
//!
//! Owns one cart and turns it into a total.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout Operations                              │
//! │                                                                         │
//! │  Caller                  Checkout                 Effect                │
//! │  ──────                  ────────                 ──────                │
//! │                                                                         │
//! │  scan(id, weight?) ────► catalog lookup ───────► cart.push(line)       │
//! │                          weight contract          cache.remove(id)      │
//! │                                                   returns quote         │
//! │                                                                         │
//! │  remove(id, weight?) ──► first matching line ──► cart.remove(i)        │
//! │                                                   cache.remove(id)      │
//! │                                                                         │
//! │  reset() ──────────────────────────────────────► cart.clear()          │
//! │                                                   cache.clear()         │
//! │                                                                         │
//! │  total() ──────────────► aggregate per product                          │
//! │                          snapshot (cache or store) ► price_line()       │
//! │                          sum in first-scan order                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cart Model
//! The cart is an ordered list of scan events, not a quantity map. Removal
//! takes out one scan event. Aggregation happens only when a total is asked
//! for.
//!
//! ## Cache
//! Each product's `(price, is_weighted, markdowns, promotions)` is fetched
//! once and reused by later totals. Any scan or removal of that product
//! drops its entry; `reset` drops all of them. Entries are never patched in
//! place.
//!
//! A price or rule edit made after the last total and without a touch of
//! that product is therefore not seen until the product is scanned or
//! removed again. Deletion is the exception: every total checks that a
//! cached product is still in the catalog, and evicts it if not.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CheckoutError, CoreResult};
use crate::money::Money;
use crate::promotions::{price_line, PromotionApplication};
use crate::rules::{CatalogLookup, RuleStore};
use crate::types::{CartLine, LineQuantity, Markdown, Promotion, PromotionOrder};

// =============================================================================
// Configuration
// =============================================================================

/// Engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfig {
    /// Order in which a product's promotions are applied.
    pub promotion_order: PromotionOrder,
}

// =============================================================================
// Receipt
// =============================================================================

/// One product's contribution to the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: String,
    pub name: String,
    pub quantity: LineQuantity,
    /// Catalog price (per unit or per weight unit).
    pub unit_price: Money,
    /// Catalog price minus active markdowns.
    pub effective_price: Money,
    /// `effective_price × quantity` before promotions.
    pub subtotal: Money,
    pub line_total: Money,
    pub promotions: Vec<PromotionApplication>,
}

/// Itemised result of pricing the whole cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Priced products in first-scan order.
    pub lines: Vec<PricedLine>,
    /// Scanned products that no longer exist in the catalog.
    pub skipped: Vec<String>,
    pub total: Money,
}

impl Receipt {
    /// Sum of every promotion discount on the receipt.
    pub fn promotion_savings(&self) -> Money {
        self.lines
            .iter()
            .flat_map(|line| line.promotions.iter())
            .map(|applied| applied.discount)
            .sum()
    }

    /// Sum of markdown reductions (catalog price minus effective price,
    /// times quantity).
    pub fn markdown_savings(&self) -> Money {
        self.lines
            .iter()
            .map(|line| {
                let per_unit = line.unit_price - line.effective_price;
                match line.quantity {
                    LineQuantity::Units(q) => per_unit * q,
                    LineQuantity::Weight(w) => per_unit * w,
                }
            })
            .sum()
    }
}

// =============================================================================
// Internal State
// =============================================================================

/// Cached per-product pricing inputs.
#[derive(Debug, Clone)]
struct PricingSnapshot {
    name: String,
    price: Money,
    is_weighted: bool,
    markdowns: Vec<Markdown>,
    promotions: Vec<Promotion>,
}

/// Per-product totals of the cart lines.
#[derive(Debug, Default)]
struct Aggregate {
    units: u32,
    weight: f64,
    weighted_lines: usize,
}

/// Orders promotions for application.
///
/// `Priority` is a stable ascending sort; promotions without a priority keep
/// their relative order after all prioritised ones.
fn order_promotions(promotions: &mut [Promotion], order: PromotionOrder) {
    if order == PromotionOrder::Priority {
        promotions.sort_by_key(|p| (p.priority.is_none(), p.priority));
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// The pricing engine for one checkout session.
///
/// ## Ownership
/// `C` and `R` are usually cloneable handles onto shared stores, so catalog
/// edits made elsewhere are visible here. Plain references work as well.
///
/// ## Example
/// ```rust,ignore
/// let mut checkout = Checkout::new(products.clone(), promotions.clone());
/// checkout.scan(&soup.id, None)?;
/// checkout.scan(&beef.id, Some(1.5))?;
/// println!("{}", checkout.total());
/// ```
#[derive(Debug)]
pub struct Checkout<C, R> {
    catalog: C,
    rules: R,
    config: CheckoutConfig,
    cart: Vec<CartLine>,
    cache: HashMap<String, PricingSnapshot>,
}

impl<C: CatalogLookup, R: RuleStore> Checkout<C, R> {
    /// Creates an empty checkout with default settings.
    pub fn new(catalog: C, rules: R) -> Self {
        Self::with_config(catalog, rules, CheckoutConfig::default())
    }

    /// Creates an empty checkout with the given settings.
    pub fn with_config(catalog: C, rules: R, config: CheckoutConfig) -> Self {
        Checkout {
            catalog,
            rules,
            config,
            cart: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Adds one scan event to the cart.
    ///
    /// ## Returns
    /// The discount-free quote for this scan alone: `price` for a unit item,
    /// `price × weight` for a weighted one.
    ///
    /// ## Errors
    /// - `ProductNotFound` if the catalog does not know `product_id`
    /// - `WeightRequired` / `WeightNotAllowed` if `weight` disagrees with the
    ///   product's `is_weighted`
    /// - `InvalidWeight` if a weight is zero, negative or not finite
    ///
    /// A failed scan leaves the cart and cache untouched.
    pub fn scan(&mut self, product_id: &str, weight: Option<f64>) -> CoreResult<Money> {
        let product = self
            .catalog
            .get_product(product_id)
            .ok_or_else(|| CheckoutError::ProductNotFound(product_id.to_string()))?;

        match (product.is_weighted, weight) {
            (true, None) => {
                return Err(CheckoutError::WeightRequired {
                    product_id: product_id.to_string(),
                })
            }
            (false, Some(_)) => {
                return Err(CheckoutError::WeightNotAllowed {
                    product_id: product_id.to_string(),
                })
            }
            (true, Some(w)) if !w.is_finite() || w <= 0.0 => {
                return Err(CheckoutError::InvalidWeight {
                    product_id: product_id.to_string(),
                    weight: w,
                })
            }
            _ => {}
        }

        self.cart.push(CartLine {
            product_id: product_id.to_string(),
            weight,
        });
        self.cache.remove(product_id);

        let quote = product.quote(weight);
        debug!(product_id, ?weight, %quote, lines = self.cart.len(), "Scanned item");
        Ok(quote)
    }

    /// Removes the first cart line for `product_id`.
    ///
    /// With `Some(weight)` only a line with exactly that weight matches; with
    /// `None` the first line of the product matches whatever its weight.
    /// Returns false when nothing matched.
    pub fn remove(&mut self, product_id: &str, weight: Option<f64>) -> bool {
        let Some(index) = self
            .cart
            .iter()
            .position(|line| line.matches(product_id, weight))
        else {
            debug!(product_id, ?weight, "No matching cart line to remove");
            return false;
        };

        self.cart.remove(index);
        self.cache.remove(product_id);
        debug!(product_id, ?weight, lines = self.cart.len(), "Removed item");
        true
    }

    /// Empties the cart and the whole cache.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.cache.clear();
        debug!("Checkout reset");
    }

    /// Total price of the cart after markdowns and promotions.
    ///
    /// Never fails. A product deleted from the catalog after being scanned
    /// contributes zero. Calling this repeatedly without mutating the cart
    /// returns the same value.
    pub fn total(&mut self) -> Money {
        self.breakdown().total
    }

    /// Prices the cart product by product.
    ///
    /// `breakdown().total` is the value `total()` returns.
    pub fn breakdown(&mut self) -> Receipt {
        let now = Utc::now();
        let mut lines = Vec::new();
        let mut skipped = Vec::new();
        let mut total = Money::zero();

        for (product_id, amount) in self.aggregate() {
            let Some(snapshot) = self.snapshot(&product_id, now) else {
                warn!(product_id = %product_id, "Scanned product no longer in catalog, skipping");
                skipped.push(product_id);
                continue;
            };

            let stray_lines = if snapshot.is_weighted {
                amount.units as usize
            } else {
                amount.weighted_lines
            };
            if stray_lines > 0 {
                warn!(
                    product_id = %product_id,
                    stray_lines,
                    is_weighted = snapshot.is_weighted,
                    "Cart lines do not match product kind, ignoring them"
                );
            }

            let quantity = if snapshot.is_weighted {
                if amount.weighted_lines == 0 {
                    continue;
                }
                LineQuantity::Weight(amount.weight)
            } else {
                if amount.units == 0 {
                    continue;
                }
                LineQuantity::Units(amount.units)
            };

            let pricing = price_line(
                snapshot.price,
                &snapshot.markdowns,
                &snapshot.promotions,
                quantity,
            );
            total += pricing.line_total;

            lines.push(PricedLine {
                product_id,
                name: snapshot.name.clone(),
                quantity,
                unit_price: snapshot.price,
                effective_price: pricing.effective_price,
                subtotal: pricing.subtotal,
                line_total: pricing.line_total,
                promotions: pricing.applications,
            });
        }

        debug!(products = lines.len(), skipped = skipped.len(), %total, "Computed total");
        Receipt {
            lines,
            skipped,
            total,
        }
    }

    /// Groups cart lines by product, in order of each product's first scan.
    fn aggregate(&self) -> Vec<(String, Aggregate)> {
        let mut grouped: Vec<(String, Aggregate)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for line in &self.cart {
            let slot = *index.entry(line.product_id.as_str()).or_insert_with(|| {
                grouped.push((line.product_id.clone(), Aggregate::default()));
                grouped.len() - 1
            });

            let amount = &mut grouped[slot].1;
            match line.weight {
                Some(w) => {
                    amount.weight += w;
                    amount.weighted_lines += 1;
                }
                None => amount.units = amount.units.saturating_add(1),
            }
        }

        grouped
    }

    /// Returns the cached snapshot, filling it from the stores on a miss.
    ///
    /// A hit still confirms the product exists; the cached price and rules
    /// are kept. A product missing from the catalog yields `None`, and any
    /// stale entry for it is evicted.
    fn snapshot(&mut self, product_id: &str, now: DateTime<Utc>) -> Option<&PricingSnapshot> {
        if self.cache.contains_key(product_id) {
            if self.catalog.get_product(product_id).is_none() {
                self.cache.remove(product_id);
                debug!(product_id, "Evicted snapshot for deleted product");
                return None;
            }
        } else {
            let product = self.catalog.get_product(product_id)?;
            let markdowns = self.rules.active_markdowns(product_id, now);
            let mut promotions = self.rules.active_promotions(product_id, now);
            order_promotions(&mut promotions, self.config.promotion_order);

            debug!(
                product_id,
                price = %product.price,
                markdowns = markdowns.len(),
                promotions = promotions.len(),
                "Cached pricing snapshot"
            );

            self.cache.insert(
                product_id.to_string(),
                PricingSnapshot {
                    name: product.name,
                    price: product.price,
                    is_weighted: product.is_weighted,
                    markdowns,
                    promotions,
                },
            );
        }

        self.cache.get(product_id)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Scan events in cart order.
    pub fn lines(&self) -> &[CartLine] {
        &self.cart
    }

    /// Number of scan events.
    pub fn len(&self) -> usize {
        self.cart.len()
    }

    /// True when nothing is scanned.
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// True when a pricing snapshot for `product_id` is cached.
    pub fn is_cached(&self, product_id: &str) -> bool {
        self.cache.contains_key(product_id)
    }

    pub fn config(&self) -> CheckoutConfig {
        self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
