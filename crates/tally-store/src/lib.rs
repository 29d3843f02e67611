//! # tally-store: Storage and Glue for Tally POS
//!
//! In-memory repositories that feed the pricing engine, plus the
//! configuration, seed-file and facade code around it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  checkout-demo / caller                                                │
//! │       │  PosConfig::load() ──► PosSystem::from_config()                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │    config     │    │  repositories  │    │    seed      │  │   │
//! │  │   │  pos.toml     │    │ ProductRepo    │◄───│ grocery.toml │  │   │
//! │  │   │  TALLY_* env  │    │ PromotionRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────┬────────┘    └──────────────┘  │   │
//! │  │                                │ CatalogLookup / RuleStore      │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                tally-core Checkout (pricing)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`repository`] - Product and promotion repositories
//! - [`config`] - `PosConfig` from file, environment and defaults
//! - [`seed`] - TOML seed files
//! - [`pos`] - `PosSystem` facade
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_store::{PosConfig, PosSystem};
//!
//! let config = PosConfig::load_or_default(None);
//! let (mut pos, seeded) = PosSystem::from_config(&config)?;
//!
//! let soup = seeded.as_ref().and_then(|s| s.id("soup")).unwrap_or_default().to_string();
//! pos.scan(&soup, None)?;
//! println!("Total: {}", pos.total());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod pos;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::PosConfig;
pub use error::{StoreError, StoreResult};
pub use pos::{PosCheckout, PosSystem};
pub use seed::{SeedFile, SeedSummary};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::promotion::PromotionRepository;
