//! # Seed Data Generator
//!
//! Populates the database with demo users, catalog and offers for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront_dev.db with the default catalog
//! cargo run -p storefront-db --bin seed
//!
//! # Limit the number of offers
//! cargo run -p storefront-db --bin seed -- --offers 20
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! ## Generated Data
//! - Two users: `admin@storefront.test` (admin) and `user@storefront.test` (user)
//! - A handful of manufacturers and products
//! - Offers pairing them, priced $4.99 - $89.99 with stock 0 - 40
//!
//! Everything is written in one transaction: a failed seed leaves nothing.

use std::env;
use storefront_core::{
    validation::ValidationResult, NewManufacturer, NewOffer, NewProduct, Role,
};
use storefront_db::{CatalogRepository, Database, DbConfig, UserRepository};

const MANUFACTURERS: &[(&str, i64)] = &[
    ("Acme Industries", 4),
    ("Northwind Goods", 5),
    ("Globex", 3),
    ("Initech Hardware", 2),
];

const PRODUCTS: &[(&str, &str)] = &[
    ("Desk Lamp", "Adjustable LED desk lamp"),
    ("Office Chair", "Ergonomic mesh chair"),
    ("Mechanical Keyboard", "Tenkeyless, brown switches"),
    ("USB-C Hub", "7-in-1 hub with HDMI"),
    ("Monitor Stand", "Bamboo riser"),
    ("Noise Cancelling Headphones", "Over-ear, 30h battery"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut max_offers: usize = MANUFACTURERS.len() * PRODUCTS.len();
    let mut db_path = String::from("./storefront_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--offers" | "-o" => {
                if i + 1 < args.len() {
                    max_offers = args[i + 1].parse().unwrap_or(max_offers);
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
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --offers <N>   Maximum number of offers to create (default: all pairs)");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Storefront Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Offers:   up to {}", max_offers);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut tx = db.begin().await?;

    if UserRepository::get_by_email(&mut tx, "admin@storefront.test")
        .await?
        .is_some()
    {
        println!("⚠ Database is already seeded");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    let admin = UserRepository::insert(&mut tx, "Store Admin", "admin@storefront.test", Role::Admin).await?;
    let user = UserRepository::insert(&mut tx, "Demo User", "user@storefront.test", Role::User).await?;
    println!("✓ Users: {} (admin), {} (user)", admin.id, user.id);

    let mut manufacturers = Vec::with_capacity(MANUFACTURERS.len());
    for (name, rating) in MANUFACTURERS {
        let input = NewManufacturer {
            name: name.to_string(),
            rating: *rating,
        }
        .validated()?;
        manufacturers.push(CatalogRepository::insert_manufacturer(&mut tx, &input).await?);
    }
    println!("✓ Manufacturers: {}", manufacturers.len());

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (idx, (name, description)) in PRODUCTS.iter().enumerate() {
        let input = NewProduct {
            name: name.to_string(),
            description: Some(description.to_string()),
            rating: (idx % 6) as i64,
        }
        .validated()?;
        products.push(CatalogRepository::insert_product(&mut tx, &input).await?);
    }
    println!("✓ Products: {}", products.len());

    let mut generated = 0;
    'outer: for (p_idx, product) in products.iter().enumerate() {
        for (m_idx, manufacturer) in manufacturers.iter().enumerate() {
            if generated >= max_offers {
                break 'outer;
            }
            let input = generate_offer(&product.id, &manufacturer.id, p_idx * 10 + m_idx)?;
            CatalogRepository::insert_offer(&mut tx, &input).await?;
            generated += 1;
        }
    }

    tx.commit().await?;

    println!();
    println!("✓ Generated {} offers in {:?}", generated, start.elapsed());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one offer with deterministic price and stock.
fn generate_offer(product_id: &str, manufacturer_id: &str, seed: usize) -> ValidationResult<NewOffer> {
    // $4.99 - $89.99
    let price_cents = 499 + ((seed * 137) % 8500) as i64;
    // 0 - 40, so some offers start sold out
    let stock = (seed * 7 % 41) as i64;

    NewOffer {
        product_id: product_id.to_string(),
        manufacturer_id: manufacturer_id.to_string(),
        price_cents,
        stock: Some(stock),
    }
    .validated()
}
