//! # Checkout Demo
//!
//! Loads a catalog, scans a basket and prints the receipt.
//!
//! ## Usage
//! ```bash
//! # Bundled grocery seed, default basket
//! cargo run -p tally-store --bin checkout-demo
//!
//! # Own basket: product keys, `key=weight` for weighted items
//! cargo run -p tally-store --bin checkout-demo -- cereal cereal cereal beef=1.5
//!
//! # Own seed and config, JSON receipt
//! cargo run -p tally-store --bin checkout-demo -- --seed ./seed.toml --config ./pos.toml --json soup
//! ```
//!
//! Logging follows `RUST_LOG`, falling back to `logging.filter` from the
//! config (`TALLY_LOG` overrides the file).

use std::env;
use std::path::PathBuf;

use tally_core::{LineQuantity, Receipt};
use tally_store::{PosConfig, PosSystem, SeedFile};
use tracing::{info, warn};

const BUNDLED_SEED: &str = include_str!("../../seed/grocery.toml");

const DEFAULT_BASKET: &[&str] = &[
    "cereal", "cereal", "cereal", "beans", "beans", "beans", "beans", "soup", "beef=1.5",
    "bananas=1.2", "bananas=0.8", "steak=3.0",
];

/// One basket entry: a seed key and an optional weight.
struct BasketItem {
    key: String,
    weight: Option<f64>,
}

impl BasketItem {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.split_once('=') {
            Some((key, weight)) => {
                let weight = weight
                    .parse::<f64>()
                    .map_err(|e| format!("Invalid weight in '{}': {}", raw, e))?;
                Ok(BasketItem {
                    key: key.to_string(),
                    weight: Some(weight),
                })
            }
            None => Ok(BasketItem {
                key: raw.to_string(),
                weight: None,
            }),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut seed_path: Option<PathBuf> = None;
    let mut json = false;
    let mut basket: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--seed" | "-s" => {
                if i + 1 < args.len() {
                    seed_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                println!("Tally POS Checkout Demo");
                println!();
                println!("Usage: checkout-demo [OPTIONS] [ITEM...]");
                println!();
                println!("Items are seed keys; use key=weight for weighted products.");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -s, --seed <PATH>    Seed file (default: config, then bundled)");
                println!("      --json           Print the receipt as JSON");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => basket.push(other.to_string()),
        }
        i += 1;
    }

    // Load failures are logged through a default subscriber, before the
    // configured one is installed.
    let mut config = tracing::subscriber::with_default(PosConfig::bootstrap_subscriber(), || {
        PosConfig::load_or_default(config_path)
    });
    if seed_path.is_some() {
        config.seed.path = seed_path;
    }
    tracing::subscriber::set_global_default(config.subscriber())?;

    let seed = match config.seed_path() {
        Some(path) => SeedFile::from_path(path)?,
        None => SeedFile::parse(BUNDLED_SEED)?,
    };

    let mut pos = PosSystem::with_checkout_config(config.checkout_config());
    let summary = pos.seed(&seed)?;
    info!(
        products = summary.product_ids.len(),
        order = %config.checkout.promotion_order,
        "Catalog ready"
    );

    if basket.is_empty() {
        basket = DEFAULT_BASKET.iter().map(|s| s.to_string()).collect();
    }

    for raw in &basket {
        let item = match BasketItem::parse(raw) {
            Ok(item) => item,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };
        let product_id = summary.id(&item.key).unwrap_or(&item.key).to_string();
        match pos.scan(&product_id, item.weight) {
            Ok(quote) => info!(key = %item.key, %quote, "Scanned"),
            Err(e) => warn!(key = %item.key, "Scan rejected: {}", e),
        }
    }

    let receipt = pos.breakdown();
    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        print_receipt(&receipt);
    }

    Ok(())
}

fn print_receipt(receipt: &Receipt) {
    println!();
    println!("Tally POS Receipt");
    println!("=================");

    for line in &receipt.lines {
        let quantity = match line.quantity {
            LineQuantity::Units(q) => format!("{} @ {}", q, line.effective_price),
            LineQuantity::Weight(w) => format!("{:.3} lb @ {}/lb", w, line.effective_price),
        };
        println!("{:<24} {:<22} {:>10}", line.name, quantity, line.line_total.to_string());

        if line.effective_price != line.unit_price {
            println!("    markdown from {}", line.unit_price);
        }
        for applied in &line.promotions {
            let label = applied.description.as_deref().unwrap_or(&applied.kind);
            println!(
                "    {} x{}  -{}",
                label, applied.sets_applied, applied.discount
            );
        }
    }

    for product_id in &receipt.skipped {
        println!("{:<24} (no longer in catalog)", product_id);
    }

    println!("-----------------");
    println!("Markdown savings:  {}", receipt.markdown_savings());
    println!("Promotion savings: {}", receipt.promotion_savings());
    println!("TOTAL:             {}", receipt.total);
}
