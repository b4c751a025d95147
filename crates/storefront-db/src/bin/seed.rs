//! # Seed Data Generator
//!
//! Populates the database with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p storefront-db --bin seed
//!
//! # Generate a custom amount into a specific database
//! cargo run -p storefront-db --bin seed -- --count 1000 --db ./data/storefront.db
//!
//! # Load products from a JSON file instead
//! cargo run -p storefront-db --bin seed -- --file products.json
//! ```
//!
//! A seed file is a JSON array of products:
//! ```json
//! [{ "id": "p1", "name": "Slim Shirt", "slug": "slim-shirt",
//!    "image": "/images/p1.jpg", "price": 12000, "countInStock": 10 }]
//! ```

use std::path::PathBuf;

use clap::Parser;
use storefront_core::{Money, Product};
use storefront_db::repository::product::generate_product_id;
use storefront_db::{Database, DbConfig};

/// Product lines for realistic demo data.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "shirts",
        &[
            "Slim Shirt",
            "Fit Shirt",
            "Oxford Shirt",
            "Linen Shirt",
            "Flannel Shirt",
            "Denim Shirt",
        ],
    ),
    (
        "pants",
        &[
            "Classic Pants",
            "Slim Chinos",
            "Cargo Pants",
            "Wool Trousers",
            "Joggers",
        ],
    ),
    (
        "outerwear",
        &[
            "Rain Jacket",
            "Puffer Coat",
            "Denim Jacket",
            "Trench Coat",
            "Fleece Vest",
        ],
    ),
    (
        "shoes",
        &["Canvas Sneakers", "Leather Boots", "Running Shoes", "Loafers"],
    ),
];

/// Colour variants with a price addon in cents.
const VARIANTS: &[(&str, i64)] = &[
    ("Black", 0),
    ("White", 0),
    ("Navy", 250),
    ("Olive", 250),
    ("Burgundy", 500),
    ("Sand", 500),
];

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Storefront seed data generator")]
struct Args {
    /// Number of products to generate
    #[arg(short, long, default_value_t = 200)]
    count: usize,

    /// Database file path
    #[arg(short, long, default_value = "./storefront_dev.db")]
    db: PathBuf,

    /// Load products from a JSON file instead of generating them
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("🌱 Storefront Seed Data Generator");
    println!("=================================");
    println!("Database: {}", args.db.display());
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let products = match &args.file {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            serde_json::from_str::<Vec<Product>>(&json)?
        }
        None => generate_catalog(args.count),
    };

    println!();
    println!("Inserting {} products...", products.len());

    let start = std::time::Instant::now();
    let mut inserted = 0usize;

    for product in &products {
        if let Err(e) = db.products().insert(product).await {
            eprintln!("Failed to insert {}: {}", product.slug, e);
            continue;
        }
        inserted += 1;
    }

    println!();
    println!("✓ Inserted {} products in {:?}", inserted, start.elapsed());

    for product in db.products().list(5).await? {
        println!("  {:<28} {:>10}  ({} in stock)", product.name, product.price, product.count_in_stock);
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates up to `count` products across all categories and variants.
fn generate_catalog(count: usize) -> Vec<Product> {
    CATEGORIES
        .iter()
        .flat_map(|(category, names)| names.iter().map(move |name| (*category, *name)))
        .flat_map(|(category, name)| {
            VARIANTS
                .iter()
                .map(move |(variant, addon)| (category, name, *variant, *addon))
        })
        .enumerate()
        .take(count)
        .map(|(seed, (category, name, variant, addon))| generate_product(category, name, variant, addon, seed))
        .collect()
}

/// Generates a single product with realistic data.
fn generate_product(category: &str, name: &str, variant: &str, price_addon: i64, seed: usize) -> Product {
    let full_name = format!("{} {}", variant, name);
    let slug = full_name.to_lowercase().replace(' ', "-");

    // $19.99 - $99.99 base + variant addon
    let base_price = 1999 + ((seed * 1733) % 8000) as i64;

    Product {
        id: generate_product_id(),
        name: full_name,
        image: format!("/images/{}/{}.jpg", category, slug),
        slug,
        price: Money::from_cents(base_price + price_addon),
        count_in_stock: (seed % 41) as i64,
    }
}
