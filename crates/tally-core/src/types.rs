//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Product      │   │    Markdown     │   │     Promotion       │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │   │  product_id     │   │  product_id         │   │
//! │  │  name           │   │  discount_amount│   │  window, cap        │   │
//! │  │  price          │   │  valid window   │   │  kind ──┐           │   │
//! │  │  is_weighted    │   └─────────────────┘   └─────────┼───────────┘   │
//! │  └─────────────────┘                                   ▼               │
//! │                                      ┌────────────────────────────────┐│
//! │  ┌─────────────────┐                 │ PromotionKind                  ││
//! │  │    CartLine     │                 │  BuyNGetMOff { buy, get, % }   ││
//! │  │  product_id     │                 │  NForX { quantity, price }     ││
//! │  │  weight: Option │                 │  Weighted { buy_w, get_w, % }  ││
//! │  └─────────────────┘                 └────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Validity Windows
//! Markdowns and promotions are half-open intervals: a rule is active at
//! `now` when `is_active && valid_from <= now < valid_to`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Unit price, or price per weight unit when `is_weighted`.
    pub price: Money,

    /// Sold by weight (scan carries a weight) instead of by unit.
    pub is_weighted: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Immediate, discount-free quote for a single scan.
    ///
    /// ```text
    /// unit item:      price
    /// weighted item:  price × weight
    /// ```
    pub fn quote(&self, weight: Option<f64>) -> Money {
        match weight {
            Some(w) => self.price * w,
            None => self.price,
        }
    }
}

// =============================================================================
// Markdown
// =============================================================================

/// A standing absolute price reduction on a product.
///
/// Active markdowns stack: the effective price is the product price minus
/// the sum of every active markdown's `discount_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Markdown {
    pub id: String,
    pub product_id: String,
    /// Subtracted from the unit price or price per weight unit.
    pub discount_amount: Money,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_active: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Markdown {
    /// Checks `is_active && valid_from <= now < valid_to`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        is_within_window(self.is_active, self.valid_from, self.valid_to, now)
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// The three promotion payloads.
///
/// Tagged by `type` on the wire:
/// ```json
/// { "type": "buy_n_get_m_off", "buyQuantity": 2, "getQuantity": 1, "discountPercent": 50 }
/// { "type": "n_for_x", "quantity": 3, "price": 5.0 }
/// { "type": "weighted", "buyWeight": 1.0, "getWeight": 0.5, "discountPercent": 25 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionKind {
    /// Buy `buy_quantity`, get `get_quantity` at `discount_percent` off.
    /// Unit items only.
    #[serde(rename_all = "camelCase")]
    BuyNGetMOff {
        buy_quantity: u32,
        get_quantity: u32,
        discount_percent: f64,
    },

    /// `quantity` units for a bundle `price`. Unit items only.
    #[serde(rename_all = "camelCase")]
    NForX { quantity: u32, price: Money },

    /// Buy `buy_weight`, get `get_weight` at `discount_percent` off.
    /// Weighted items only.
    #[serde(rename_all = "camelCase")]
    Weighted {
        buy_weight: f64,
        get_weight: f64,
        discount_percent: f64,
    },
}

impl PromotionKind {
    /// True for the variants that price by unit count.
    pub fn applies_to_units(&self) -> bool {
        !self.applies_to_weight()
    }

    /// True for the variant that prices by accumulated weight.
    pub fn applies_to_weight(&self) -> bool {
        matches!(self, PromotionKind::Weighted { .. })
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PromotionKind::BuyNGetMOff { .. } => "buy_n_get_m_off",
            PromotionKind::NForX { .. } => "n_for_x",
            PromotionKind::Weighted { .. } => "weighted",
        }
    }
}

/// A quantity- or weight-conditioned discount rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: String,
    pub product_id: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub is_active: bool,
    /// Cap on the number of times the rule applies.
    #[serde(default)]
    pub max_applications: Option<u32>,
    /// Only consulted with `PromotionOrder::Priority`.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Stored but not enforced.
    #[serde(default)]
    pub stackable: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: PromotionKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Promotion {
    /// Checks `is_active && valid_from <= now < valid_to`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        is_within_window(self.is_active, self.valid_from, self.valid_to, now)
    }
}

fn is_within_window(
    is_active: bool,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    is_active && valid_from <= now && now < valid_to
}

/// Order in which a product's promotions are applied.
///
/// ## Why It Matters
/// NForX replaces the running line total, so a BuyNGetMOff applied after it
/// discounts a different amount than one applied before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionOrder {
    /// Order returned by the rule store (insertion order).
    #[default]
    Insertion,

    /// Ascending `priority`, stable; unprioritised promotions go last.
    Priority,
}

impl fmt::Display for PromotionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromotionOrder::Insertion => write!(f, "insertion"),
            PromotionOrder::Priority => write!(f, "priority"),
        }
    }
}

impl std::str::FromStr for PromotionOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insertion" | "insert" => Ok(PromotionOrder::Insertion),
            "priority" => Ok(PromotionOrder::Priority),
            other => Err(format!(
                "Unknown promotion order: '{}'. Valid options: insertion, priority",
                other
            )),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One scan event.
///
/// `weight` is `None` for unit items and `Some` for weighted items; the scan
/// checks this against the product's `is_weighted` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl CartLine {
    /// A unit scan.
    pub fn unit(product_id: impl Into<String>) -> Self {
        CartLine {
            product_id: product_id.into(),
            weight: None,
        }
    }

    /// A weighted scan.
    pub fn weighted(product_id: impl Into<String>, weight: f64) -> Self {
        CartLine {
            product_id: product_id.into(),
            weight: Some(weight),
        }
    }

    /// Matches `product_id`, and `weight` exactly when one is given.
    pub fn matches(&self, product_id: &str, weight: Option<f64>) -> bool {
        if self.product_id != product_id {
            return false;
        }
        match weight {
            Some(w) => self.weight == Some(w),
            None => true,
        }
    }
}

/// Aggregated amount of one product in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum LineQuantity {
    /// Number of unit scans.
    Units(u32),
    /// Sum of scanned weights.
    Weight(f64),
}

// =============================================================================
// Create / Update Requests
// =============================================================================

/// Request to create a product. Id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub is_weighted: bool,
}

/// Partial product update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub is_weighted: Option<bool>,
}

/// Request to create a markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMarkdown {
    pub product_id: String,
    pub discount_amount: Money,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl NewMarkdown {
    /// An active markdown of `discount_amount` over the given window.
    pub fn new(
        product_id: impl Into<String>,
        discount_amount: Money,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        NewMarkdown {
            product_id: product_id.into(),
            discount_amount,
            valid_from,
            valid_to,
            is_active: true,
            reason: None,
            priority: None,
        }
    }
}

/// Request to create a promotion of any variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromotion {
    pub product_id: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub max_applications: Option<u32>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub stackable: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: PromotionKind,
}

impl NewPromotion {
    /// An active, uncapped promotion for `product_id` over the given window.
    pub fn new(
        product_id: impl Into<String>,
        kind: PromotionKind,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        NewPromotion {
            product_id: product_id.into(),
            valid_from,
            valid_to,
            is_active: true,
            max_applications: None,
            priority: None,
            stackable: None,
            description: None,
            kind,
        }
    }

    /// Sets `max_applications`.
    pub fn with_max_applications(mut self, max: u32) -> Self {
        self.max_applications = Some(max);
        self
    }

    /// Sets `priority`.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Unit Tests
// =============================================================================
