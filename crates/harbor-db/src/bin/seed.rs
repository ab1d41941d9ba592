//! # Seed Data Generator
//!
//! Populates a Harbor POS database with stores, tenders, products and
//! opening stock for local development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/harbor.db with 3 stores
//! cargo run -p harbor-db --bin seed
//!
//! # More branches, custom path
//! cargo run -p harbor-db --bin seed -- --stores 5 --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - Stores `S001..`, the first one named "Headquarters"
//! - Payment methods CASH, CARD, MOBILE
//! - One product per catalog entry below, each with a QR code and barcode
//! - Opening balance 0-60 per store/product, safety stock 5
//!
//! Opening balances are not sales or stocktakes, so the ledger starts empty.

use std::env;

use harbor_core::{Money, NewProduct, DEFAULT_COMPANY_ID};
use harbor_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// Catalog entries: (category code, [(name, price)])
const CATEGORIES: &[(&str, &[(&str, f64)])] = &[
    (
        "BEV",
        &[
            ("Oolong Tea 500ml", 2.50),
            ("Green Tea 500ml", 2.30),
            ("Black Coffee 300ml", 3.20),
            ("Latte 300ml", 3.80),
            ("Mineral Water 600ml", 1.10),
            ("Sparkling Water 330ml", 1.60),
            ("Orange Juice 1L", 4.20),
            ("Soy Milk 400ml", 1.90),
        ],
    ),
    (
        "SNK",
        &[
            ("Seaweed Crisps", 2.80),
            ("Potato Chips Salted", 2.20),
            ("Rice Crackers", 1.70),
            ("Milk Chocolate Bar", 1.50),
            ("Peanut Candy", 1.20),
            ("Mixed Nuts 150g", 5.60),
        ],
    ),
    (
        "DRY",
        &[
            ("Whole Milk 1L", 3.10),
            ("Plain Yogurt 500g", 2.90),
            ("Cheddar Slices", 4.40),
            ("Butter 250g", 4.90),
            ("Eggs Dozen", 3.60),
        ],
    ),
    (
        "GRO",
        &[
            ("Jasmine Rice 2kg", 7.80),
            ("Instant Noodles 5-Pack", 3.40),
            ("Soy Sauce 500ml", 2.60),
            ("Sesame Oil 250ml", 4.10),
            ("Canned Tuna", 1.90),
            ("Wheat Flour 1kg", 1.80),
        ],
    ),
];

/// Tenders every store accepts
const PAYMENT_METHODS: &[(&str, &str)] = &[("CASH", "Cash"), ("CARD", "Card"), ("MOBILE", "Mobile Pay")];

const SAFETY_STOCK: f64 = 5.0;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut store_count: usize = 3;
    let mut db_path = String::from("./data/harbor.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stores" | "-s" => {
                if i + 1 < args.len() {
                    store_count = args[i + 1].parse().unwrap_or(3).max(1);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Harbor POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --stores <N>   Number of stores to create (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/harbor.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Harbor POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Stores:   {}", store_count);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let catalog = db.catalog();
    let existing = catalog.list_stores(DEFAULT_COMPANY_ID).await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} stores", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Stores
    let mut store_ids = Vec::with_capacity(store_count);
    for n in 1..=store_count {
        let name = if n == 1 {
            "Headquarters".to_string()
        } else {
            format!("Branch {}", n - 1)
        };
        let id = catalog
            .insert_store(DEFAULT_COMPANY_ID, &format!("S{:03}", n), &name)
            .await?;
        store_ids.push(id);
    }
    println!("✓ Created {} stores", store_ids.len());

    // Tenders
    for (code, name) in PAYMENT_METHODS {
        catalog.insert_payment_method(DEFAULT_COMPANY_ID, code, name).await?;
    }
    println!("✓ Created {} payment methods", PAYMENT_METHODS.len());

    // Products and opening stock
    let inventory = db.inventory();
    let mut generated = 0usize;

    for (category_idx, (category_code, products)) in CATEGORIES.iter().enumerate() {
        for (product_idx, (name, price)) in products.iter().enumerate() {
            let seed = category_idx * 100 + product_idx;
            let product = generate_product(category_code, name, *price, seed);

            let product_id = match catalog.insert_product(&product).await {
                Ok(id) => id,
                Err(e) => {
                    eprintln!("Failed to insert {}: {}", product.sku, e);
                    continue;
                }
            };

            for (store_idx, store_id) in store_ids.iter().enumerate() {
                let qty = ((seed * 7 + store_idx * 13) % 61) as f64;
                inventory
                    .initialize(DEFAULT_COMPANY_ID, *store_id, product_id, qty, SAFETY_STOCK)
                    .await?;
            }

            generated += 1;
        }
    }

    println!("✓ Created {} products", generated);
    println!(
        "✓ Stocked {} store/product pairs",
        generated * store_ids.len()
    );

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Builds one catalog product with codes derived from its position.
fn generate_product(category: &str, name: &str, price: f64, seed: usize) -> NewProduct {
    let sku = format!("{}-{:04}", category, seed);

    // Cost between 55% and 75% of price
    let cost_pct = 55.0 + (seed % 21) as f64;
    let cost = (price * cost_pct).round() / 100.0;

    NewProduct {
        company_id: DEFAULT_COMPANY_ID,
        qr_code: Some(format!("QR-{}", sku)),
        // EAN-13 shaped, checksum not valid
        barcode: Some(format!("471{:010}", seed)),
        sku,
        name: name.to_string(),
        price: Money::from_amount(price),
        cost: Money::from_amount(cost),
    }
}
