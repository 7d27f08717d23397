//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and a few customers.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p mostrador-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p mostrador-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p mostrador-db --bin seed -- --db ./data/mostrador.db
//!
//! # Write the empty import template instead of seeding
//! cargo run -p mostrador-db --bin seed -- --sample-xlsx ./plantilla.xlsx
//! ```
//!
//! ## Generated Products
//! - Code: `{CATEGORY}-{INDEX}`, e.g. `ALM-014`
//! - Description: product plus presentation, e.g. "Yerba mate 1 kg"
//! - Price: $150.00 - $4,140.00 plus a presentation addon
//! - Stock: 0 - 60 (every 61st product starts out of stock)

use std::env;

use mostrador_core::{NewCustomer, NewProduct};
use mostrador_db::{import, Database, DbConfig};

/// Product families for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "ALM",
        &[
            "Arroz largo fino",
            "Fideos spaghetti",
            "Fideos tirabuzón",
            "Harina 000",
            "Harina leudante",
            "Azúcar",
            "Yerba mate",
            "Polenta",
            "Lentejas",
            "Puré de tomate",
            "Aceite de girasol",
            "Sal fina",
        ],
    ),
    (
        "BEB",
        &[
            "Agua mineral",
            "Soda",
            "Gaseosa cola",
            "Gaseosa lima limón",
            "Jugo de naranja",
            "Cerveza rubia",
            "Vino tinto",
            "Amargo serrano",
        ],
    ),
    (
        "LAC",
        &[
            "Leche entera",
            "Leche descremada",
            "Yogur bebible",
            "Queso cremoso",
            "Queso rallado",
            "Manteca",
            "Dulce de leche",
            "Crema de leche",
        ],
    ),
    (
        "LIM",
        &[
            "Lavandina",
            "Detergente",
            "Jabón en polvo",
            "Suavizante",
            "Limpiador de pisos",
            "Esponja",
        ],
    ),
];

/// Presentations with price addon in cents
const SIZES: &[(&str, i64)] = &[("500 g", 0), ("1 kg", 35_000), ("pack x 3", 90_000)];

const CUSTOMERS: &[(&str, Option<&str>, Option<&str>)] = &[
    ("Almacén Don Pepe", Some("30-71234567-1"), Some("11 4555-0101")),
    ("María López", Some("27-28765432-4"), None),
    ("Club Social Villa Crespo", Some("30-70011223-9"), Some("11 4777-2020")),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./mostrador_dev.db");
    let mut sample_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--sample-xlsx" => {
                if i + 1 < args.len() {
                    sample_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mostrador Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>        Products to generate (default: 200)");
                println!("  -d, --db <PATH>        Database file (default: ./mostrador_dev.db)");
                println!("      --sample-xlsx <F>  Write the import template to F and exit");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(path) = sample_path {
        std::fs::write(&path, import::sample_spreadsheet()?)?;
        println!("✓ Import template written to {}", path);
        return Ok(());
    }

    println!("🌱 Mostrador Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");
    let start = std::time::Instant::now();

    let mut products = Vec::with_capacity(count);
    'outer: for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        for (product_idx, name) in names.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if products.len() >= count {
                    break 'outer;
                }
                let seed = category_idx * 1000 + product_idx * 10 + size_idx;
                products.push(generate_product(
                    category_code,
                    products.len() + 1,
                    name,
                    size,
                    *price_addon,
                    seed,
                ));
            }
        }
    }

    // Past the named catalog, fill with numbered variants
    let mut extra = 0;
    while products.len() < count {
        extra += 1;
        products.push(generate_product(
            "VAR",
            extra,
            "Artículo varios",
            "unidad",
            0,
            extra * 7,
        ));
    }

    let generated = db.products().upsert_by_code(&products).await?;

    let mut customers = 0;
    for (name, tax_id, phone) in CUSTOMERS {
        let customer = NewCustomer {
            name: name.to_string(),
            tax_id: tax_id.map(str::to_string),
            phone: phone.map(str::to_string),
        };
        match db.customers().insert(customer).await {
            Ok(_) => customers += 1,
            Err(e) => eprintln!("Failed to insert customer {}: {}", name, e),
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products and {} customers in {:?}", generated, customers, elapsed);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(
    category: &str,
    index: usize,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> NewProduct {
    // Base price $150.00 - $4,140.00
    let base_price = 15_000 + ((seed * 37) % 400) as i64 * 1_000;

    NewProduct {
        code: format!("{}-{:03}", category, index),
        description: format!("{} {}", name, size),
        price_cents: base_price + price_addon,
        stock: (seed % 61) as i64,
    }
}
