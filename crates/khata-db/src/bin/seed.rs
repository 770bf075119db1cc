//! # Seed Data Generator
//!
//! Populates a khata database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p khata-db --bin seed
//!
//! # Specify database path
//! cargo run -p khata-db --bin seed -- --db ./data/khata.db
//! ```
//!
//! ## Generated Data
//! - Customers with mobile numbers and places
//! - A bakery-style product catalogue
//! - Employees (daily and monthly salaried)
//! - Opening stock levels for products and raw materials
//! - A raw material price list

use std::env;

use tracing_subscriber::EnvFilter;

use khata_core::{
    Money, NewCustomer, NewEmployee, NewProduct, NewRawMaterialPrice, Quantity, SalaryType,
    StockType,
};
use khata_db::{Database, DbConfig};

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Asif Traders", "0301-1234567", "Anarkali"),
    ("Bilal General Store", "0302-2345678", "Ichhra"),
    ("Maryam Stores", "0303-3456789", "Model Town"),
    ("Hamza Karyana", "0304-4567890", "Samanabad"),
    ("Noor Bakers Retail", "0305-5678901", "Gulberg"),
];

const PRODUCTS: &[(&str, &str, &str)] = &[
    ("Bread", "bakery", "pcs"),
    ("Rusk", "bakery", "packet"),
    ("Bun", "bakery", "pcs"),
    ("Cake", "bakery", "pcs"),
    ("Biscuit", "bakery", "kg"),
];

const EMPLOYEES: &[(&str, SalaryType, i64, &str)] = &[
    ("Rashid", SalaryType::Daily, 800, "Gulberg"),
    ("Saima", SalaryType::Daily, 750, "Ichhra"),
    ("Imran", SalaryType::Monthly, 1100, "Model Town"),
];

/// (name, unit, opening qty, price per unit in rupees)
const RAW_MATERIALS: &[(&str, &str, i64, i64)] = &[
    ("Flour", "kg", 200, 85),
    ("Sugar", "kg", 80, 90),
    ("Ghee", "kg", 40, 450),
    ("Yeast", "kg", 10, 450),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./khata_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Khata Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./khata_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Khata Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Schema reconciled");

    // Skip seeding a database that already has data.
    let existing = db.customers().list_all().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} customers", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding customers...");
    for (name, mobile, place) in CUSTOMERS {
        db.customers()
            .create(NewCustomer {
                name: name.to_string(),
                mobile: Some(mobile.to_string()),
                place: Some(place.to_string()),
            })
            .await?;
    }
    println!("  {} customers", CUSTOMERS.len());

    println!("Seeding products and opening stock...");
    for (name, category, unit) in PRODUCTS {
        db.products()
            .create(NewProduct {
                name: name.to_string(),
                category: Some(category.to_string()),
                unit: unit.to_string(),
            })
            .await?;
        db.stock()
            .set(StockType::Product, name, Quantity::from_whole(50), Some(unit))
            .await?;
    }
    println!("  {} products", PRODUCTS.len());

    println!("Seeding employees...");
    for (name, salary_type, daily_salary, area) in EMPLOYEES {
        db.employees()
            .create(NewEmployee {
                name: name.to_string(),
                salary_type: *salary_type,
                daily_salary: Money::from_rupees(*daily_salary),
                mobile: None,
                area: Some(area.to_string()),
            })
            .await?;
    }
    println!("  {} employees", EMPLOYEES.len());

    println!("Seeding raw materials...");
    for (name, unit, opening_qty, price) in RAW_MATERIALS {
        db.stock()
            .set(
                StockType::RawMaterial,
                name,
                Quantity::from_whole(*opening_qty),
                Some(unit),
            )
            .await?;
        db.prices()
            .create(NewRawMaterialPrice {
                name: name.to_string(),
                unit: unit.to_string(),
                price_per_unit: Money::from_rupees(*price),
            })
            .await?;
    }
    println!("  {} raw materials", RAW_MATERIALS.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
