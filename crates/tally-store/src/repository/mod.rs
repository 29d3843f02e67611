//! # Repository Module
//!
//! In-memory repositories for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and the Engine                          │
//! │                                                                         │
//! │  Caller (seed loader, demo, back office)                               │
//! │       │                                                                 │
//! │       │  products.add(..)   promotions.add_n_for_x(..)                 │
//! │       ▼                                                                 │
//! │  ProductRepository               PromotionRepository                   │
//! │  ├── add / update / delete       ├── add_markdown / add_promotion      │
//! │  ├── get / all / find_by_name    ├── deactivate_*                      │
//! │  └── impl CatalogLookup          └── impl RuleStore                    │
//! │       ▲                                ▲                                │
//! │       │  get_product(id)               │  active_*(id, now)             │
//! │       └──────────── Checkout ──────────┘                                │
//! │                                                                         │
//! │  Both are cheap-to-clone handles; every clone sees the same data.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`] - Product CRUD and name search
//! - [`PromotionRepository`] - Markdown and promotion storage

pub mod product;
pub mod promotion;

pub use product::ProductRepository;
pub use promotion::PromotionRepository;
