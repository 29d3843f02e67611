//! # tally-core: Checkout Pricing for Tally POS
//!
//! This crate prices a shopping cart: it aggregates scanned items, applies
//! markdowns and promotions per product, and sums the result. It performs
//! no I/O; products and rules are read through two traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Callers (checkout-demo, lanes)                  │   │
//! │  │        scan ──► scan ──► remove ──► total ──► reset             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │ checkout  │  │promotions │  │   types    │  │ validation│  │   │
//! │  │   │ cart,     │─►│ markdowns │  │  Product   │  │  create   │  │   │
//! │  │   │ cache     │  │ 3 kinds   │  │  Promotion │  │  requests │  │   │
//! │  │   └─────┬─────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │         │ CatalogLookup / RuleStore (rules module)             │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────┼───────────────────────────────────────────────────────┘   │
//! │  ┌─────────▼───────────────────────────────────────────────────────┐   │
//! │  │                    tally-store                                  │   │
//! │  │        in-memory repositories, config, seed files               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`checkout`] - The pricing engine (cart, cache, totals, receipts)
//! - [`promotions`] - Markdown application and the three promotion evaluators
//! - [`rules`] - Traits the engine uses to reach the catalog and rule store
//! - [`shared`] - Mutex-guarded checkout handle
//! - [`types`] - Domain types (Product, Markdown, Promotion, CartLine)
//! - [`money`] - Double-precision money amount
//! - [`error`] - Domain error types
//! - [`validation`] - Create/update request rules
//!
//! ## Design Principles
//!
//! 1. **Pure Pricing**: same cart + same store state = same total
//! 2. **No I/O**: storage lives behind `CatalogLookup` / `RuleStore`
//! 3. **Unrounded Money**: totals keep full f64 precision; display rounds
//! 4. **Explicit Errors**: scan failures are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::promotions::n_for_x;
//!
//! // 3 for $5 on a $2.00 item, 7 scanned: two bundles + one single
//! let (bundles, total) = n_for_x(Money::new(2.0), 7, 3, Money::new(5.0), None);
//! assert_eq!(bundles, 2);
//! assert_eq!(total, Money::new(12.0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod promotions;
pub mod rules;
pub mod shared;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Checkout` instead of
// `use tally_core::checkout::Checkout`

pub use checkout::{Checkout, CheckoutConfig, PricedLine, Receipt};
pub use error::{CheckoutError, CoreResult, ValidationError};
pub use money::Money;
pub use promotions::PromotionApplication;
pub use rules::{CatalogLookup, RuleStore};
pub use shared::SharedCheckout;
pub use types::*;
