//! # Promotion Repository
//!
//! In-memory storage for markdowns and promotions, in insertion order.
//!
//! ## Active Rule Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  active_promotions("soup", now)                                         │
//! │                                                                         │
//! │  promo-1  soup   active  [mon, sun)   ← MATCH                           │
//! │  promo-2  beef   active  [mon, sun)     other product                   │
//! │  promo-3  soup   INACTIVE              deactivated                      │
//! │  promo-4  soup   active  [sun, wed)     not started yet                 │
//! │  promo-5  soup   active  [mon, sun)   ← MATCH                           │
//! │                                                                         │
//! │  Result: [promo-1, promo-5]  (insertion order preserved)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tally_core::validation::{validate_new_markdown, validate_new_promotion};
use tally_core::{Markdown, Money, NewMarkdown, NewPromotion, Promotion, PromotionKind, RuleStore};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreResult;

#[derive(Debug, Default)]
struct Rules {
    markdowns: Vec<Markdown>,
    promotions: Vec<Promotion>,
}

/// Repository for markdowns and promotions.
///
/// Cloning yields another handle onto the same rules.
#[derive(Debug, Clone, Default)]
pub struct PromotionRepository {
    rules: Arc<RwLock<Rules>>,
}

impl PromotionRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Rules> {
        self.rules.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Rules> {
        self.rules.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Markdowns
    // =========================================================================

    /// Creates a markdown.
    ///
    /// ## Validation
    /// - `product_id` non-empty
    /// - `discount_amount` finite and >= 0
    /// - `valid_from < valid_to`
    pub fn add_markdown(&self, new: NewMarkdown) -> StoreResult<Markdown> {
        validate_new_markdown(&new)?;

        let markdown = Markdown {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            discount_amount: new.discount_amount,
            valid_from: new.valid_from,
            valid_to: new.valid_to,
            is_active: new.is_active,
            reason: new.reason,
            priority: new.priority,
            created_at: Utc::now(),
            updated_at: None,
        };

        debug!(
            id = %markdown.id,
            product_id = %markdown.product_id,
            amount = %markdown.discount_amount,
            "Adding markdown"
        );
        self.write().markdowns.push(markdown.clone());
        Ok(markdown)
    }

    /// Marks a markdown inactive. Returns false if the id is unknown.
    pub fn deactivate_markdown(&self, id: &str) -> bool {
        let mut rules = self.write();
        let Some(markdown) = rules.markdowns.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        markdown.is_active = false;
        markdown.updated_at = Some(Utc::now());
        debug!(id = %id, "Deactivated markdown");
        true
    }

    /// Every stored markdown, active or not.
    pub fn all_markdowns(&self) -> Vec<Markdown> {
        self.read().markdowns.clone()
    }

    // =========================================================================
    // Promotions
    // =========================================================================

    /// Creates a promotion of any variant.
    ///
    /// ## Validation
    /// See `tally_core::validation::validate_new_promotion`.
    pub fn add_promotion(&self, new: NewPromotion) -> StoreResult<Promotion> {
        validate_new_promotion(&new)?;

        let promotion = Promotion {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            valid_from: new.valid_from,
            valid_to: new.valid_to,
            is_active: new.is_active,
            max_applications: new.max_applications,
            priority: new.priority,
            stackable: new.stackable,
            description: new.description,
            kind: new.kind,
            created_at: Utc::now(),
            updated_at: None,
        };

        debug!(
            id = %promotion.id,
            product_id = %promotion.product_id,
            kind = promotion.kind.name(),
            max_applications = ?promotion.max_applications,
            "Adding promotion"
        );
        self.write().promotions.push(promotion.clone());
        Ok(promotion)
    }

    /// Buy `buy_quantity`, get `get_quantity` at `discount_percent` off.
    #[allow(clippy::too_many_arguments)]
    pub fn add_buy_n_get_m_off(
        &self,
        product_id: &str,
        buy_quantity: u32,
        get_quantity: u32,
        discount_percent: f64,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        max_applications: Option<u32>,
    ) -> StoreResult<Promotion> {
        let mut new = NewPromotion::new(
            product_id,
            PromotionKind::BuyNGetMOff {
                buy_quantity,
                get_quantity,
                discount_percent,
            },
            valid_from,
            valid_to,
        );
        new.max_applications = max_applications;
        self.add_promotion(new)
    }

    /// `quantity` units for `price`.
    pub fn add_n_for_x(
        &self,
        product_id: &str,
        quantity: u32,
        price: Money,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        max_applications: Option<u32>,
    ) -> StoreResult<Promotion> {
        let mut new = NewPromotion::new(
            product_id,
            PromotionKind::NForX { quantity, price },
            valid_from,
            valid_to,
        );
        new.max_applications = max_applications;
        self.add_promotion(new)
    }

    /// Buy `buy_weight`, get `get_weight` at `discount_percent` off.
    #[allow(clippy::too_many_arguments)]
    pub fn add_weighted(
        &self,
        product_id: &str,
        buy_weight: f64,
        get_weight: f64,
        discount_percent: f64,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        max_applications: Option<u32>,
    ) -> StoreResult<Promotion> {
        let mut new = NewPromotion::new(
            product_id,
            PromotionKind::Weighted {
                buy_weight,
                get_weight,
                discount_percent,
            },
            valid_from,
            valid_to,
        );
        new.max_applications = max_applications;
        self.add_promotion(new)
    }

    /// Marks a promotion inactive. Returns false if the id is unknown.
    pub fn deactivate_promotion(&self, id: &str) -> bool {
        let mut rules = self.write();
        let Some(promotion) = rules.promotions.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        promotion.is_active = false;
        promotion.updated_at = Some(Utc::now());
        debug!(id = %id, "Deactivated promotion");
        true
    }

    /// Every stored promotion, active or not.
    pub fn all_promotions(&self) -> Vec<Promotion> {
        self.read().promotions.clone()
    }
}

impl RuleStore for PromotionRepository {
    fn active_markdowns(&self, product_id: &str, now: DateTime<Utc>) -> Vec<Markdown> {
        self.read()
            .markdowns
            .iter()
            .filter(|m| m.product_id == product_id && m.is_active_at(now))
            .cloned()
            .collect()
    }

    fn active_promotions(&self, product_id: &str, now: DateTime<Utc>) -> Vec<Promotion> {
        self.read()
            .promotions
            .iter()
            .filter(|p| p.product_id == product_id && p.is_active_at(now))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::days(1), now + Duration::days(7))
    }

    #[test]
    fn test_active_promotions_filter_and_order() {
        let repo = PromotionRepository::new();
        let (from, to) = window();
        let now = Utc::now();

        let first = repo
            .add_n_for_x("soup", 3, Money::new(5.0), from, to, None)
            .unwrap();
        repo.add_buy_n_get_m_off("beef", 1, 1, 50.0, from, to, None)
            .unwrap();
        let inactive = repo
            .add_buy_n_get_m_off("soup", 1, 1, 50.0, from, to, None)
            .unwrap();
        repo.add_n_for_x(
            "soup",
            2,
            Money::new(3.0),
            now + Duration::days(2),
            now + Duration::days(3),
            None,
        )
        .unwrap();
        let last = repo
            .add_buy_n_get_m_off("soup", 2, 1, 100.0, from, to, Some(1))
            .unwrap();

        assert!(repo.deactivate_promotion(&inactive.id));

        let active = repo.active_promotions("soup", now);
        let ids: Vec<_> = active.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), last.id.as_str()]);
        assert_eq!(active[1].max_applications, Some(1));
        assert_eq!(repo.all_promotions().len(), 5);
    }

    #[test]
    fn test_window_edges() {
        let repo = PromotionRepository::new();
        let (from, to) = window();
        repo.add_markdown(NewMarkdown::new("soup", Money::new(0.2), from, to))
            .unwrap();

        assert_eq!(repo.active_markdowns("soup", from).len(), 1);
        assert!(repo.active_markdowns("soup", to).is_empty());
        assert!(repo.active_markdowns("beef", from).is_empty());
    }

    #[test]
    fn test_deactivate_markdown() {
        let repo = PromotionRepository::new();
        let (from, to) = window();
        let markdown = repo
            .add_markdown(NewMarkdown::new("soup", Money::new(0.2), from, to))
            .unwrap();

        assert!(repo.deactivate_markdown(&markdown.id));
        assert!(!repo.deactivate_markdown("missing"));
        assert!(repo.active_markdowns("soup", Utc::now()).is_empty());
        assert!(repo.all_markdowns()[0].updated_at.is_some());
    }

    #[test]
    fn test_invalid_rules_are_not_stored() {
        let repo = PromotionRepository::new();
        let (from, to) = window();

        assert!(repo
            .add_markdown(NewMarkdown::new("soup", Money::new(-0.2), from, to))
            .is_err());
        assert!(repo
            .add_buy_n_get_m_off("soup", 0, 1, 50.0, from, to, None)
            .is_err());
        assert!(repo
            .add_weighted("beef", 1.0, 1.0, 150.0, from, to, None)
            .is_err());
        assert!(repo
            .add_n_for_x("soup", 3, Money::new(5.0), to, from, None)
            .is_err());
        assert!(repo
            .add_n_for_x("soup", 3, Money::new(5.0), from, to, Some(0))
            .is_err());

        assert!(repo.all_markdowns().is_empty());
        assert!(repo.all_promotions().is_empty());
    }

    #[test]
    fn test_inactive_on_create() {
        let repo = PromotionRepository::new();
        let (from, to) = window();
        let mut new = NewMarkdown::new("soup", Money::new(0.2), from, to);
        new.is_active = false;
        repo.add_markdown(new).unwrap();
        assert!(repo.active_markdowns("soup", Utc::now()).is_empty());
    }
}
