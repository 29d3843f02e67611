//! # POS Configuration
//!
//! Configuration for the checkout engine and its tooling.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_PROMOTION_ORDER=priority                                     │
//! │     TALLY_LOG=debug                                                    │
//! │     TALLY_SEED_PATH=./seed.toml                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/pos.toml (Linux)                                     │
//! │     ~/Library/Application Support/com.tally.pos/pos.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     insertion order, "info,tally=debug", no seed file                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pos.toml
//! [checkout]
//! promotion_order = "insertion"   # insertion | priority
//!
//! [logging]
//! filter = "info,tally=debug"
//!
//! [seed]
//! path = "seed.toml"
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use tally_core::{CheckoutConfig, PromotionOrder};
use tracing::{debug, info, warn, Subscriber};
use tracing_subscriber::EnvFilter;

use crate::error::{StoreError, StoreResult};

/// Environment variable overriding `checkout.promotion_order`.
pub const ENV_PROMOTION_ORDER: &str = "TALLY_PROMOTION_ORDER";
/// Environment variable overriding `logging.filter`.
pub const ENV_LOG: &str = "TALLY_LOG";
/// Environment variable overriding `seed.path`.
pub const ENV_SEED_PATH: &str = "TALLY_SEED_PATH";

// =============================================================================
// Checkout Settings
// =============================================================================

/// Pricing engine settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Order in which a product's promotions are applied.
    ///
    /// `insertion` keeps the order rules were created in. `priority` sorts
    /// by ascending rule priority, unprioritised rules last.
    #[serde(default, deserialize_with = "deserialize_promotion_order")]
    pub promotion_order: PromotionOrder,
}

/// Accepts any casing and the `insert` alias, like the environment override.
fn deserialize_promotion_order<'de, D>(deserializer: D) -> Result<PromotionOrder, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing-subscriber` filter directive. `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,tally=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Seed Settings
// =============================================================================

/// Where to load catalog and rules from at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedSettings {
    /// Seed file path; relative paths resolve against the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete POS configuration.
///
/// ## Example Config File
/// ```toml
/// [checkout]
/// promotion_order = "priority"
///
/// [logging]
/// filter = "warn,tally_core=debug"
///
/// [seed]
/// path = "/etc/tally/seed.toml"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosConfig {
    /// Pricing engine settings.
    #[serde(default)]
    pub checkout: CheckoutSettings,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Seed file settings.
    #[serde(default)]
    pub seed: SeedSettings,
}

impl PosConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pos.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading POS config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load POS config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file as pretty TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "POS config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.logging.filter.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "logging.filter must not be empty".into(),
            ));
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.filter) {
            return Err(StoreError::InvalidConfig(format!(
                "logging.filter is not a valid filter: {}",
                e
            )));
        }

        if let Some(ref path) = self.seed.path {
            if path.as_os_str().is_empty() {
                return Err(StoreError::InvalidConfig(
                    "seed.path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// An unparseable promotion order is ignored with a warning.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(order) = lookup(ENV_PROMOTION_ORDER) {
            match order.parse::<PromotionOrder>() {
                Ok(parsed) => {
                    debug!(order = %parsed, "Overriding promotion order from environment");
                    self.checkout.promotion_order = parsed;
                }
                Err(e) => warn!(order = %order, "{}", e),
            }
        }

        if let Some(filter) = lookup(ENV_LOG) {
            debug!(filter = %filter, "Overriding log filter from environment");
            self.logging.filter = filter;
        }

        if let Some(path) = lookup(ENV_SEED_PATH) {
            debug!(path = %path, "Overriding seed path from environment");
            self.seed.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "pos")
            .map(|dirs| dirs.config_dir().join("pos.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Engine settings derived from this config.
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            promotion_order: self.checkout.promotion_order,
        }
    }

    /// Returns the configured seed file, if any.
    pub fn seed_path(&self) -> Option<&PathBuf> {
        self.seed.path.as_ref()
    }

    // =========================================================================
    // Logging
    // =========================================================================

    /// Log filter for binaries: `RUST_LOG` wins, then `logging.filter`.
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.logging.filter))
    }

    /// Formatting subscriber honouring [`Self::log_filter`].
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        fmt_subscriber(self.log_filter())
    }

    /// Subscriber used while the config itself is being loaded.
    pub fn bootstrap_subscriber() -> impl Subscriber + Send + Sync + 'static {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
        fmt_subscriber(filter)
    }
}

/// The filter alone decides what is enabled; no extra level cap is layered
/// on top of it.
fn fmt_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt().with_env_filter(filter).finish()
}
