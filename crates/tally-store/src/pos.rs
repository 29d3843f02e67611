//! # POS System
//!
//! Wires the repositories and one checkout together.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PosSystem                                                              │
//! │  ├── products   : ProductRepository ─────┐ (same Arc)                  │
//! │  ├── promotions : PromotionRepository ───┼──┐                          │
//! │  └── checkout   : Checkout<products', promotions'>                     │
//! │                                                                         │
//! │  Back-office edits through products()/promotions() are seen by the     │
//! │  checkout on its next cache miss.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_core::{Checkout, CheckoutConfig, CoreResult, Money, Receipt, SharedCheckout};
use tracing::info;

use crate::config::PosConfig;
use crate::error::StoreResult;
use crate::repository::{ProductRepository, PromotionRepository};
use crate::seed::{SeedFile, SeedSummary};

/// The checkout engine this crate builds.
pub type PosCheckout = Checkout<ProductRepository, PromotionRepository>;

/// Catalog, rules and a checkout session.
#[derive(Debug)]
pub struct PosSystem {
    products: ProductRepository,
    promotions: PromotionRepository,
    checkout: PosCheckout,
}

impl PosSystem {
    /// Empty stores, default engine settings.
    pub fn new() -> Self {
        Self::with_checkout_config(CheckoutConfig::default())
    }

    /// Empty stores with the given engine settings.
    pub fn with_checkout_config(config: CheckoutConfig) -> Self {
        let products = ProductRepository::new();
        let promotions = PromotionRepository::new();
        let checkout = Checkout::with_config(products.clone(), promotions.clone(), config);
        PosSystem {
            products,
            promotions,
            checkout,
        }
    }

    /// Builds from a loaded config, applying its seed file when one is set.
    pub fn from_config(config: &PosConfig) -> StoreResult<(Self, Option<SeedSummary>)> {
        let system = Self::with_checkout_config(config.checkout_config());
        info!(
            promotion_order = %config.checkout.promotion_order,
            "POS system created"
        );

        let summary = match config.seed_path() {
            Some(path) => Some(system.seed(&SeedFile::from_path(path)?)?),
            None => None,
        };

        Ok((system, summary))
    }

    /// Loads a seed into the stores.
    pub fn seed(&self, seed: &SeedFile) -> StoreResult<SeedSummary> {
        seed.apply(&self.products, &self.promotions)
    }

    /// A separate, lockable checkout over the same stores.
    pub fn open_lane(&self) -> SharedCheckout<ProductRepository, PromotionRepository> {
        SharedCheckout::with_config(
            self.products.clone(),
            self.promotions.clone(),
            self.checkout.config(),
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub fn promotions(&self) -> &PromotionRepository {
        &self.promotions
    }

    pub fn checkout(&self) -> &PosCheckout {
        &self.checkout
    }

    pub fn checkout_mut(&mut self) -> &mut PosCheckout {
        &mut self.checkout
    }

    // =========================================================================
    // Checkout Shortcuts
    // =========================================================================

    pub fn scan(&mut self, product_id: &str, weight: Option<f64>) -> CoreResult<Money> {
        self.checkout.scan(product_id, weight)
    }

    pub fn remove(&mut self, product_id: &str, weight: Option<f64>) -> bool {
        self.checkout.remove(product_id, weight)
    }

    pub fn total(&mut self) -> Money {
        self.checkout.total()
    }

    pub fn breakdown(&mut self) -> Receipt {
        self.checkout.breakdown()
    }

    pub fn reset(&mut self) {
        self.checkout.reset()
    }
}

impl Default for PosSystem {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use std::path::PathBuf;
    use tally_core::{CheckoutError, NewMarkdown, NewProduct, ProductUpdate, PromotionOrder};
    use tempfile::TempDir;

    const EPSILON: f64 = 1e-9;

    fn assert_total(actual: Money, expected: f64) {
        assert!(
            (actual.amount() - expected).abs() < EPSILON,
            "expected {expected}, got {}",
            actual.amount()
        );
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::days(1), now + Duration::days(7))
    }

    fn add(pos: &PosSystem, name: &str, price: f64, is_weighted: bool) -> String {
        pos.products()
            .add(NewProduct {
                name: name.to_string(),
                price: Money::new(price),
                is_weighted,
            })
            .unwrap()
            .id
    }

    fn scan_times(pos: &mut PosSystem, id: &str, times: usize) {
        for _ in 0..times {
            pos.scan(id, None).unwrap();
        }
    }

    #[test]
    fn test_mixed_basket() {
        let mut pos = PosSystem::new();
        let apple = add(&pos, "Apple", 1.50, false);
        let bananas = add(&pos, "Bananas", 2.38, true);

        scan_times(&mut pos, &apple, 2);
        assert_eq!(pos.scan(&bananas, Some(1.5)).unwrap().amount(), 2.38 * 1.5);
        assert_total(pos.total(), 6.57);
    }

    #[test]
    fn test_reset_returns_zero() {
        let mut pos = PosSystem::new();
        let soup = add(&pos, "Soup", 1.89, false);
        scan_times(&mut pos, &soup, 3);
        pos.reset();
        assert_eq!(pos.total(), Money::zero());
    }

    #[test]
    fn test_unknown_and_weight_errors() {
        let mut pos = PosSystem::new();
        let beef = add(&pos, "Ground Beef", 5.99, true);
        let soup = add(&pos, "Soup", 1.89, false);

        assert!(matches!(
            pos.scan("non-existent", None),
            Err(CheckoutError::ProductNotFound(_))
        ));
        assert!(pos.scan(&beef, None).unwrap_err().is_invalid_weight());
        assert!(pos.scan(&soup, Some(1.0)).unwrap_err().is_invalid_weight());
        assert!(!pos.remove("non-existent", None));
        assert!(pos.checkout().is_empty());
    }

    #[test]
    fn test_buy_two_get_one_then_remove() {
        let mut pos = PosSystem::new();
        let cereal = add(&pos, "Cereal", 4.00, false);
        let (from, to) = window();
        pos.promotions()
            .add_buy_n_get_m_off(&cereal, 2, 1, 50.0, from, to, None)
            .unwrap();

        scan_times(&mut pos, &cereal, 3);
        assert_total(pos.total(), 10.0);
        assert!(pos.remove(&cereal, None));
        assert_total(pos.total(), 8.0);
    }

    #[test]
    fn test_n_for_x_capped_through_repository() {
        let mut pos = PosSystem::new();
        let soup = add(&pos, "Soup", 2.00, false);
        let (from, to) = window();
        pos.promotions()
            .add_n_for_x(&soup, 3, Money::new(5.0), from, to, Some(1))
            .unwrap();

        scan_times(&mut pos, &soup, 6);
        assert_total(pos.total(), 11.0);
    }

    #[test]
    fn test_weighted_promotion_through_repository() {
        let mut pos = PosSystem::new();
        let ham = add(&pos, "Ham", 4.00, true);
        let (from, to) = window();
        pos.promotions()
            .add_weighted(&ham, 1.0, 0.5, 25.0, from, to, None)
            .unwrap();

        pos.scan(&ham, Some(2.0)).unwrap();
        pos.scan(&ham, Some(2.5)).unwrap();
        assert_total(pos.total(), 16.5);
    }

    #[test]
    fn test_markdown_stack_with_promotion() {
        let mut pos = PosSystem::new();
        let bread = add(&pos, "Bread", 2.00, false);
        let (from, to) = window();
        pos.promotions()
            .add_markdown(NewMarkdown::new(&bread, Money::new(0.25), from, to))
            .unwrap();
        pos.promotions()
            .add_buy_n_get_m_off(&bread, 1, 1, 50.0, from, to, None)
            .unwrap();

        scan_times(&mut pos, &bread, 2);
        assert_total(pos.total(), 2.625);
    }

    #[test]
    fn test_product_deleted_after_scan() {
        let mut pos = PosSystem::new();
        let soup = add(&pos, "Soup", 2.00, false);
        let gum = add(&pos, "Gum", 1.00, false);
        pos.scan(&soup, None).unwrap();
        pos.scan(&gum, None).unwrap();

        assert!(pos.products().delete(&soup));
        let receipt = pos.breakdown();
        assert_total(receipt.total, 1.0);
        assert_eq!(receipt.skipped, vec![soup]);
    }

    #[test]
    fn test_price_update_between_scan_and_total() {
        let mut pos = PosSystem::new();
        let soup = add(&pos, "Soup", 2.00, false);
        pos.scan(&soup, None).unwrap();

        pos.products()
            .update(
                &soup,
                ProductUpdate {
                    price: Some(Money::new(2.50)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_total(pos.total(), 2.5);
    }

    #[test]
    fn test_deactivated_promotion_after_touch() {
        let mut pos = PosSystem::new();
        let soup = add(&pos, "Soup", 2.00, false);
        let (from, to) = window();
        let promo = pos
            .promotions()
            .add_n_for_x(&soup, 2, Money::new(3.0), from, to, None)
            .unwrap();

        scan_times(&mut pos, &soup, 2);
        assert_total(pos.total(), 3.0);

        pos.promotions().deactivate_promotion(&promo.id);
        // Still cached until the product is touched
        assert_total(pos.total(), 3.0);

        pos.scan(&soup, None).unwrap();
        assert_total(pos.total(), 6.0);
    }

    #[test]
    fn test_priority_order_from_config() {
        let mut config = PosConfig::default();
        config.checkout.promotion_order = PromotionOrder::Priority;
        let (mut pos, summary) = PosSystem::from_config(&config).unwrap();
        assert!(summary.is_none());

        let soup = add(&pos, "Soup", 2.00, false);
        let (from, to) = window();
        pos.promotions()
            .add_buy_n_get_m_off(&soup, 1, 1, 100.0, from, to, None)
            .unwrap();
        let mut bundle = tally_core::NewPromotion::new(
            soup.as_str(),
            tally_core::PromotionKind::NForX {
                quantity: 3,
                price: Money::new(5.0),
            },
            from,
            to,
        )
        .with_priority(1);
        bundle.description = Some("3 for $5".to_string());
        pos.promotions().add_promotion(bundle).unwrap();

        scan_times(&mut pos, &soup, 6);
        assert_total(pos.total(), 4.0);
    }

    #[test]
    fn test_from_config_with_seed_file() {
        let dir = TempDir::new().unwrap();
        let seed_path: PathBuf = dir.path().join("seed.toml");
        std::fs::write(&seed_path, include_str!("../seed/grocery.toml")).unwrap();

        let mut config = PosConfig::default();
        config.seed.path = Some(seed_path);
        let (mut pos, summary) = PosSystem::from_config(&config).unwrap();
        let summary = summary.unwrap();

        let cereal = summary.id("cereal").unwrap().to_string();
        let beef = summary.id("beef").unwrap().to_string();
        scan_times(&mut pos, &cereal, 3);
        pos.scan(&beef, Some(1.0)).unwrap();
        pos.scan(&beef, Some(2.0)).unwrap();

        assert_total(pos.total(), 10.0 + 5.99 * 3.0);
        assert!(pos.remove(&beef, Some(1.0)));
        assert_total(pos.total(), 10.0 + 11.98);
        assert!(!pos.remove(&beef, Some(1.0)));
    }

    #[test]
    fn test_lane_shares_catalog() {
        let pos = PosSystem::new();
        let gum = add(&pos, "Gum", 1.00, false);

        let lane = pos.open_lane();
        lane.scan(&gum, None).unwrap();
        lane.scan(&gum, None).unwrap();
        assert_total(lane.total(), 2.0);
        assert!(pos.checkout().is_empty());
    }
}
