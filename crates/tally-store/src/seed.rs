//! # Seed Files
//!
//! Loads a catalog and its rules from a TOML file.
//!
//! ## File Format
//! ```toml
//! [[products]]
//! key = "soup"                 # referenced by markdowns/promotions
//! name = "Tomato Soup"
//! price = 1.89
//! is_weighted = false
//!
//! [[markdowns]]
//! product = "soup"
//! amount = 0.20
//! reason = "Dented cans"
//!
//! [[promotions]]
//! product = "soup"
//! type = "n_for_x"             # buy_n_get_m_off | n_for_x | weighted
//! quantity = 3
//! price = 5.00
//! max_applications = 1         # optional
//! ```
//!
//! ## Validity Windows
//! `valid_from` / `valid_to` are optional RFC 3339 timestamps. When omitted
//! the window is `now - 1 day .. now + 7 days`.
//!
//! ## Load Flow
//! ```text
//! seed.toml ──► SeedFile (serde) ──► key check ──► products.add()
//!                                                   │  key → uuid
//!                                                   ▼
//!                                   promotions.add_markdown() / add_promotion()
//! ```
//! Product keys are checked before anything is written. After that, the
//! first invalid entry stops the load; earlier entries stay stored.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tally_core::{Money, NewMarkdown, NewProduct, NewPromotion, PromotionKind};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::repository::{ProductRepository, PromotionRepository};

// =============================================================================
// File Schema
// =============================================================================

/// A product entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedProduct {
    pub key: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub is_weighted: bool,
}

/// A markdown entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedMarkdown {
    /// Key of the product.
    pub product: String,
    pub amount: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
}

/// The promotion payload of an entry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeedPromotionKind {
    BuyNGetMOff {
        buy_quantity: u32,
        get_quantity: u32,
        discount_percent: f64,
    },
    NForX {
        quantity: u32,
        price: f64,
    },
    Weighted {
        buy_weight: f64,
        get_weight: f64,
        discount_percent: f64,
    },
}

impl From<SeedPromotionKind> for PromotionKind {
    fn from(kind: SeedPromotionKind) -> Self {
        match kind {
            SeedPromotionKind::BuyNGetMOff {
                buy_quantity,
                get_quantity,
                discount_percent,
            } => PromotionKind::BuyNGetMOff {
                buy_quantity,
                get_quantity,
                discount_percent,
            },
            SeedPromotionKind::NForX { quantity, price } => PromotionKind::NForX {
                quantity,
                price: Money::new(price),
            },
            SeedPromotionKind::Weighted {
                buy_weight,
                get_weight,
                discount_percent,
            } => PromotionKind::Weighted {
                buy_weight,
                get_weight,
                discount_percent,
            },
        }
    }
}

/// A promotion entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPromotion {
    /// Key of the product.
    pub product: String,
    #[serde(flatten)]
    pub kind: SeedPromotionKind,
    #[serde(default)]
    pub max_applications: Option<u32>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
}

/// A whole seed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub markdowns: Vec<SeedMarkdown>,
    #[serde(default)]
    pub promotions: Vec<SeedPromotion>,
}

/// What a seed load created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedSummary {
    /// Seed key → assigned product id.
    pub product_ids: BTreeMap<String, String>,
    pub markdowns: usize,
    pub promotions: usize,
}

impl SeedSummary {
    /// Product id assigned to a seed key.
    pub fn id(&self, key: &str) -> Option<&str> {
        self.product_ids.get(key).map(String::as_str)
    }
}

// =============================================================================
// Loading
// =============================================================================

impl SeedFile {
    /// Parses seed TOML.
    pub fn parse(contents: &str) -> StoreResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a seed file.
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        info!(?path, "Loading seed file");
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Checks that product keys are unique and every rule names a known key.
    fn check_keys(&self) -> StoreResult<()> {
        let mut keys = HashSet::new();
        for product in &self.products {
            if !keys.insert(product.key.as_str()) {
                return Err(StoreError::InvalidConfig(format!(
                    "Duplicate product key in seed file: {}",
                    product.key
                )));
            }
        }

        let references = self
            .markdowns
            .iter()
            .map(|m| &m.product)
            .chain(self.promotions.iter().map(|p| &p.product));
        for key in references {
            if !keys.contains(key.as_str()) {
                return Err(StoreError::not_found("Product key", key.clone()));
            }
        }

        Ok(())
    }

    /// Stores everything in the given repositories, with windows anchored
    /// at the current time.
    pub fn apply(
        &self,
        products: &ProductRepository,
        promotions: &PromotionRepository,
    ) -> StoreResult<SeedSummary> {
        self.apply_at(products, promotions, Utc::now())
    }

    /// Like `apply`, with default windows anchored at `now`.
    pub fn apply_at(
        &self,
        products: &ProductRepository,
        promotions: &PromotionRepository,
        now: DateTime<Utc>,
    ) -> StoreResult<SeedSummary> {
        self.check_keys()?;

        let default_from = now - Duration::days(1);
        let default_to = now + Duration::days(7);
        let mut summary = SeedSummary::default();

        for entry in &self.products {
            let product = products.add(NewProduct {
                name: entry.name.clone(),
                price: Money::new(entry.price),
                is_weighted: entry.is_weighted,
            })?;
            debug!(key = %entry.key, id = %product.id, "Seeded product");
            summary.product_ids.insert(entry.key.clone(), product.id);
        }

        for entry in &self.markdowns {
            let product_id = summary
                .id(&entry.product)
                .ok_or_else(|| StoreError::not_found("Product key", entry.product.clone()))?;
            let mut new = NewMarkdown::new(
                product_id,
                Money::new(entry.amount),
                entry.valid_from.unwrap_or(default_from),
                entry.valid_to.unwrap_or(default_to),
            );
            new.reason = entry.reason.clone();
            promotions.add_markdown(new)?;
            summary.markdowns += 1;
        }

        for entry in &self.promotions {
            let product_id = summary
                .id(&entry.product)
                .ok_or_else(|| StoreError::not_found("Product key", entry.product.clone()))?;
            let mut new = NewPromotion::new(
                product_id,
                entry.kind.clone().into(),
                entry.valid_from.unwrap_or(default_from),
                entry.valid_to.unwrap_or(default_to),
            );
            new.max_applications = entry.max_applications;
            new.priority = entry.priority;
            new.description = entry.description.clone();
            promotions.add_promotion(new)?;
            summary.promotions += 1;
        }

        info!(
            products = summary.product_ids.len(),
            markdowns = summary.markdowns,
            promotions = summary.promotions,
            "Seed applied"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::RuleStore;

    const GROCERY: &str = include_str!("../seed/grocery.toml");

    #[test]
    fn test_bundled_seed_parses_and_applies() {
        let seed = SeedFile::parse(GROCERY).unwrap();
        let products = ProductRepository::new();
        let promotions = PromotionRepository::new();

        let summary = seed.apply(&products, &promotions).unwrap();
        assert_eq!(summary.product_ids.len(), seed.products.len());
        assert_eq!(products.count(), seed.products.len());
        assert_eq!(promotions.all_markdowns().len(), seed.markdowns.len());
        assert_eq!(promotions.all_promotions().len(), seed.promotions.len());
    }

    #[test]
    fn test_promotion_types_and_defaults() {
        let seed = SeedFile::parse(
            r#"
            [[products]]
            key = "soup"
            name = "Tomato Soup"
            price = 2.00

            [[products]]
            key = "beef"
            name = "Ground Beef"
            price = 5.99
            is_weighted = true

            [[promotions]]
            product = "soup"
            type = "n_for_x"
            quantity = 3
            price = 5.0
            max_applications = 1

            [[promotions]]
            product = "beef"
            type = "weighted"
            buy_weight = 2.0
            get_weight = 1.0
            discount_percent = 50
            "#,
        )
        .unwrap();

        let products = ProductRepository::new();
        let promotions = PromotionRepository::new();
        let now = Utc::now();
        let summary = seed.apply_at(&products, &promotions, now).unwrap();

        let soup_id = summary.id("soup").unwrap();
        let beef = products.get(summary.id("beef").unwrap()).unwrap();
        assert!(beef.is_weighted);

        let soup_promos = promotions.active_promotions(soup_id, now);
        assert_eq!(soup_promos.len(), 1);
        assert_eq!(soup_promos[0].max_applications, Some(1));
        assert_eq!(soup_promos[0].valid_from, now - Duration::days(1));
        assert_eq!(soup_promos[0].valid_to, now + Duration::days(7));
        assert!(matches!(
            soup_promos[0].kind,
            PromotionKind::NForX { quantity: 3, .. }
        ));

        let beef_promos = promotions.active_promotions(&beef.id, now);
        assert!(matches!(
            beef_promos[0].kind,
            PromotionKind::Weighted { discount_percent, .. } if discount_percent == 50.0
        ));
    }

    #[test]
    fn test_unknown_key_writes_nothing() {
        let seed = SeedFile::parse(
            r#"
            [[products]]
            key = "soup"
            name = "Soup"
            price = 1.0

            [[markdowns]]
            product = "bread"
            amount = 0.1
            "#,
        )
        .unwrap();

        let products = ProductRepository::new();
        let promotions = PromotionRepository::new();
        let err = seed.apply(&products, &promotions).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(products.count(), 0);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let seed = SeedFile::parse(
            r#"
            [[products]]
            key = "soup"
            name = "Soup"
            price = 1.0

            [[products]]
            key = "soup"
            name = "Other Soup"
            price = 2.0
            "#,
        )
        .unwrap();

        let err = seed
            .apply(&ProductRepository::new(), &PromotionRepository::new())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let err = SeedFile::parse(
            r#"
            [[promotions]]
            product = "soup"
            type = "half_price_tuesdays"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::ConfigParse(_)));
    }

    #[test]
    fn test_explicit_window() {
        let seed = SeedFile::parse(
            r#"
            [[products]]
            key = "soup"
            name = "Soup"
            price = 1.0

            [[markdowns]]
            product = "soup"
            amount = 0.1
            valid_from = "2030-01-01T00:00:00Z"
            valid_to = "2030-02-01T00:00:00Z"
            "#,
        )
        .unwrap();

        let products = ProductRepository::new();
        let promotions = PromotionRepository::new();
        let summary = seed.apply(&products, &promotions).unwrap();

        let soup_id = summary.id("soup").unwrap();
        assert!(promotions.active_markdowns(soup_id, Utc::now()).is_empty());
        assert_eq!(summary.markdowns, 1);
    }
}
