//! # Discount Evaluators
//!
//! Pure functions that turn (price, amount, rule parameters) into an
//! adjusted line total. No state, no lookups, no rounding.
//!
//! ## Per-Product Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product.price                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  effective_price = price − Σ markdown.discount_amount   (no floor)     │
//! │       │                                                                 │
//! │       ├── Units(q) ──► line = effective × q                            │
//! │       │                 for promo in order:                             │
//! │       │                   BuyNGetMOff → line −= sets×get×eff×pct/100   │
//! │       │                   NForX       → line  = sets×bundle + rest×eff │
//! │       │                   Weighted    → ignored                         │
//! │       │                                                                 │
//! │       └── Weight(w) ─► line = effective × w                            │
//! │                         for promo in order:                             │
//! │                           Weighted    → line  = eff×w − sets×get_w×eff │
//! │                                           ×pct/100                      │
//! │                           others      → ignored                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! NForX *replaces* the running total, so a promotion listed after it works
//! on the replaced value. That order sensitivity is intentional and must
//! not be "fixed".
//!
//! Weighted also replaces: the line is recomputed from `eff × w` each time,
//! so with several Weighted promotions only the last one's discount stands.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{LineQuantity, Markdown, Promotion, PromotionKind};

// =============================================================================
// Markdowns
// =============================================================================

/// Product price minus the sum of all markdown amounts.
///
/// May go negative if markdowns exceed the price; nothing clamps it.
pub fn effective_price(price: Money, markdowns: &[Markdown]) -> Money {
    let reduction: Money = markdowns.iter().map(|m| m.discount_amount).sum();
    price - reduction
}

// =============================================================================
// Evaluators
// =============================================================================

/// Number of complete sets in `quantity`, capped by `max_applications`.
fn unit_sets(quantity: u32, set_size: u32, max_applications: Option<u32>) -> u32 {
    if set_size == 0 {
        return 0;
    }
    cap(quantity / set_size, max_applications)
}

/// Number of complete weight sets in `weight`, capped by `max_applications`.
fn weight_sets(weight: f64, set_weight: f64, max_applications: Option<u32>) -> u32 {
    if set_weight.is_nan() || set_weight <= 0.0 || !weight.is_finite() || weight <= 0.0 {
        return 0;
    }
    cap((weight / set_weight).floor() as u32, max_applications)
}

fn cap(eligible: u32, max_applications: Option<u32>) -> u32 {
    match max_applications {
        Some(max) => eligible.min(max),
        None => eligible,
    }
}

/// Buy N, get M at a percentage off.
///
/// Returns `(sets_applied, discount)`; the caller subtracts the discount
/// from the running line total.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::promotions::buy_n_get_m_off;
///
/// // $4.00 cereal, buy 2 get 1 half off, 3 scanned
/// let (sets, discount) = buy_n_get_m_off(Money::new(4.0), 3, 2, 1, 50.0, None);
/// assert_eq!(sets, 1);
/// assert_eq!(discount, Money::new(2.0));
/// ```
pub fn buy_n_get_m_off(
    effective_price: Money,
    quantity: u32,
    buy_quantity: u32,
    get_quantity: u32,
    discount_percent: f64,
    max_applications: Option<u32>,
) -> (u32, Money) {
    let sets = unit_sets(
        quantity,
        buy_quantity.saturating_add(get_quantity),
        max_applications,
    );
    let discounted_units = f64::from(sets) * f64::from(get_quantity);
    let discount = (effective_price * discounted_units).percent(discount_percent);
    (sets, discount)
}

/// N units for a bundle price.
///
/// Returns `(sets_applied, line_total)` where `line_total` REPLACES the
/// running total: bundles at the bundle price plus the remainder at the
/// effective price.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::promotions::n_for_x;
///
/// // $2.00 soup, 3 for $5, 4 scanned
/// let (sets, total) = n_for_x(Money::new(2.0), 4, 3, Money::new(5.0), None);
/// assert_eq!(sets, 1);
/// assert_eq!(total, Money::new(7.0));
/// ```
pub fn n_for_x(
    effective_price: Money,
    quantity: u32,
    bundle_quantity: u32,
    bundle_price: Money,
    max_applications: Option<u32>,
) -> (u32, Money) {
    let sets = unit_sets(quantity, bundle_quantity, max_applications);
    let remainder = quantity - sets * bundle_quantity;
    let line_total = bundle_price * sets + effective_price * remainder;
    (sets, line_total)
}

/// Buy a weight, get a weight at a percentage off.
///
/// Returns `(sets_applied, discount)` computed on the total accumulated
/// weight. The caller rebuilds the line as `effective_price × weight −
/// discount` rather than subtracting from the running total.
///
/// ## Example
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::promotions::weighted;
///
/// // $6.00/lb, buy 2 lb get 1 lb half off, 3 lb scanned
/// let (sets, discount) = weighted(Money::new(6.0), 3.0, 2.0, 1.0, 50.0, None);
/// assert_eq!(sets, 1);
/// assert_eq!(discount, Money::new(3.0));
/// ```
pub fn weighted(
    effective_price: Money,
    weight: f64,
    buy_weight: f64,
    get_weight: f64,
    discount_percent: f64,
    max_applications: Option<u32>,
) -> (u32, Money) {
    let sets = weight_sets(weight, buy_weight + get_weight, max_applications);
    let discounted_weight = f64::from(sets) * get_weight;
    let discount = (effective_price * discounted_weight).percent(discount_percent);
    (sets, discount)
}

// =============================================================================
// Line Pricing
// =============================================================================

/// One promotion that changed a line total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionApplication {
    pub promotion_id: String,
    /// Variant name, e.g. `n_for_x`.
    pub kind: String,
    pub sets_applied: u32,
    /// Line total before minus line total after.
    pub discount: Money,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of pricing one product's aggregated quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePricing {
    pub effective_price: Money,
    /// `effective_price × amount` before promotions.
    pub subtotal: Money,
    pub line_total: Money,
    pub applications: Vec<PromotionApplication>,
}

/// Applies one promotion to the running line total.
///
/// Returns the new line total and the number of sets applied. Promotions
/// for the other kind of item leave the total unchanged with zero sets.
pub fn apply_promotion(
    promotion: &Promotion,
    effective_price: Money,
    quantity: LineQuantity,
    line_total: Money,
) -> (Money, u32) {
    match (&promotion.kind, quantity) {
        (
            PromotionKind::BuyNGetMOff {
                buy_quantity,
                get_quantity,
                discount_percent,
            },
            LineQuantity::Units(q),
        ) => {
            let (sets, discount) = buy_n_get_m_off(
                effective_price,
                q,
                *buy_quantity,
                *get_quantity,
                *discount_percent,
                promotion.max_applications,
            );
            (line_total - discount, sets)
        }
        (PromotionKind::NForX { quantity, price }, LineQuantity::Units(q)) => {
            let (sets, replaced) = n_for_x(
                effective_price,
                q,
                *quantity,
                *price,
                promotion.max_applications,
            );
            (replaced, sets)
        }
        (
            PromotionKind::Weighted {
                buy_weight,
                get_weight,
                discount_percent,
            },
            LineQuantity::Weight(w),
        ) => {
            let (sets, discount) = weighted(
                effective_price,
                w,
                *buy_weight,
                *get_weight,
                *discount_percent,
                promotion.max_applications,
            );
            (effective_price * w - discount, sets)
        }
        _ => (line_total, 0),
    }
}

/// Prices one product: markdowns first, then every promotion in the given
/// order.
pub fn price_line(
    price: Money,
    markdowns: &[Markdown],
    promotions: &[Promotion],
    quantity: LineQuantity,
) -> LinePricing {
    let effective = effective_price(price, markdowns);
    let subtotal = match quantity {
        LineQuantity::Units(q) => effective * q,
        LineQuantity::Weight(w) => effective * w,
    };

    let mut line_total = subtotal;
    let mut applications = Vec::new();
    for promotion in promotions {
        let applies = match quantity {
            LineQuantity::Units(_) => promotion.kind.applies_to_units(),
            LineQuantity::Weight(_) => promotion.kind.applies_to_weight(),
        };
        if !applies {
            continue;
        }
        let (next, sets) = apply_promotion(promotion, effective, quantity, line_total);
        // NForX with zero bundles still rewrites the total (to the same value
        // in exact arithmetic), so record by sets rather than by difference.
        if sets > 0 {
            applications.push(PromotionApplication {
                promotion_id: promotion.id.clone(),
                kind: promotion.kind.name().to_string(),
                sets_applied: sets,
                discount: line_total - next,
                description: promotion.description.clone(),
            });
        }
        line_total = next;
    }

    LinePricing {
        effective_price: effective,
        subtotal,
        line_total,
        applications,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
