//! # Seed Data Generator
//!
//! Fills a database with a small warung catalog for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p kasir-db --bin seed
//! cargo run -p kasir-db --bin seed -- --db ./data/kasir.db
//! ```
//!
//! ## What Gets Created
//! - Physical products across a few categories, some already at their
//!   low-stock threshold
//! - Digital products (phone credit, e-wallet, electricity tokens) with a
//!   funded balance
//! - An opening cash float in the drawer
//! - A cashier account (`kasir` / `kasir123`)

use std::env;

use kasir_core::input::{
    CreateCashDrawerInput, CreateProductInput, CreateUserInput, UpdateDigitalBalanceInput,
};
use kasir_core::{CashDrawerType, ProductType, UserRole, DEFAULT_ACTING_USER_ID};
use kasir_db::{Database, DbConfig};

/// (category, name, sku, cost, price, stock, min_stock_alert), money in whole rupiah.
const PHYSICAL: &[(&str, &str, &str, i64, i64, i64, Option<i64>)] = &[
    ("Makanan", "Indomie Goreng", "IDM-GRG", 2_600, 3_500, 120, Some(24)),
    ("Makanan", "Indomie Soto", "IDM-SOTO", 2_600, 3_500, 18, Some(24)),
    ("Makanan", "Roti Tawar", "ROTI-TWR", 11_000, 15_000, 6, Some(5)),
    ("Minuman", "Teh Botol Sosro 350ml", "TBS-350", 3_200, 4_500, 48, Some(12)),
    ("Minuman", "Aqua 600ml", "AQUA-600", 2_400, 3_500, 96, Some(24)),
    ("Minuman", "Kopi Kapal Api Sachet", "KKA-SCH", 1_200, 2_000, 200, None),
    ("Sembako", "Beras Premium 5kg", "BRS-5KG", 62_000, 72_000, 10, Some(3)),
    ("Sembako", "Gula Pasir 1kg", "GULA-1KG", 14_500, 17_000, 2, Some(5)),
    ("Sembako", "Minyak Goreng 2L", "MNY-2L", 31_000, 36_000, 15, Some(4)),
    ("Kebersihan", "Sabun Mandi Batang", "SBN-BTG", 3_000, 4_500, 40, None),
];

/// (category, name, sku, cost, price, opening balance), money in whole rupiah.
const DIGITAL: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("Pulsa", "Pulsa 10.000", "PLS-10K", 10_250, 12_000, 500_000),
    ("Pulsa", "Pulsa 25.000", "PLS-25K", 25_150, 27_000, 500_000),
    ("E-Wallet", "Top Up DANA 50.000", "DANA-50K", 50_500, 52_000, 1_000_000),
    ("Listrik", "Token PLN 20.000", "PLN-20K", 20_500, 22_500, 400_000),
];

const OPENING_FLOAT: i64 = 500_000;

fn cents(rupiah: i64) -> i64 {
    rupiah * 100
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = "./kasir_dev.db".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(path) = args.get(i + 1) {
                    db_path = path.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kasir POS seed data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./kasir_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {other}");
                return Err(format!("unknown argument {other}").into());
            }
        }
        i += 1;
    }

    println!("Kasir POS seed data");
    println!("Database: {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.products().list().await?.len();
    if existing > 0 {
        println!("Database already has {existing} products, skipping.");
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    for &(category, name, sku, cost, price, stock, min) in PHYSICAL {
        db.products()
            .create(&CreateProductInput {
                name: name.to_string(),
                sku: Some(sku.to_string()),
                barcode: None,
                product_type: ProductType::Physical,
                category: Some(category.to_string()),
                cost_price_cents: cents(cost),
                selling_price_cents: cents(price),
                stock_quantity: stock,
                min_stock_alert: min,
            })
            .await?;
    }
    println!("✓ {} physical products", PHYSICAL.len());

    for &(category, name, sku, cost, price, balance) in DIGITAL {
        let product = db
            .products()
            .create(&CreateProductInput {
                name: name.to_string(),
                sku: Some(sku.to_string()),
                barcode: None,
                product_type: ProductType::Digital,
                category: Some(category.to_string()),
                cost_price_cents: cents(cost),
                selling_price_cents: cents(price),
                stock_quantity: 0,
                min_stock_alert: None,
            })
            .await?;

        db.digital_balances()
            .set_balance(&UpdateDigitalBalanceInput {
                product_id: product.id,
                balance_cents: cents(balance),
            })
            .await?;
    }
    println!("✓ {} digital products with balances", DIGITAL.len());

    db.cash_drawer()
        .create(
            &CreateCashDrawerInput {
                entry_type: CashDrawerType::OpeningBalance,
                amount_cents: cents(OPENING_FLOAT),
                description: "Modal awal".to_string(),
            },
            DEFAULT_ACTING_USER_ID,
        )
        .await?;
    println!("✓ Opening float {}", kasir_core::Money::from_cents(cents(OPENING_FLOAT)));

    db.users()
        .create(&CreateUserInput {
            username: "kasir".to_string(),
            full_name: "Kasir Demo".to_string(),
            password: "kasir123".to_string(),
            role: UserRole::Cashier,
        })
        .await?;
    println!("✓ Cashier account 'kasir'");

    let low = db.products().low_stock().await?;
    println!("✓ Done ({} products below their alert level)", low.len());

    db.close().await;
    Ok(())
}
