//! # Product Repository
//!
//! Catalog CRUD, search and low-stock monitoring.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types: "indo"                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pattern = %indo%   (LIKE is case-insensitive for ASCII in SQLite,      │
//! │       │              % and _ in the query are escaped)                  │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────┐                       │
//! │  │ name              │ sku       │ barcode      │                       │
//! │  │ Indomie Goreng    │ IDM-GRG   │ 089686010947 │ ← MATCH (name)        │
//! │  │ Teh Botol         │ INDO-TB   │ 089686      │ ← MATCH (sku)         │
//! │  │ Gula Pasir        │ GP-1KG    │ 899999      │                       │
//! │  └──────────────────────────────────────────────┘                       │
//! │  Inactive products never match. An empty query lists every active one. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Digital products get a zero [`DigitalBalance`](kasir_core::DigitalBalance)
//! row in the same unit of work that creates them.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use kasir_core::input::{CreateProductInput, UpdateProductInput};
use kasir_core::validation::validate_search_query;
use kasir_core::{Product, ProductType};

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, sku, barcode, product_type, category, \
     cost_price_cents, selling_price_cents, stock_quantity, min_stock_alert, is_active, \
     created_at, updated_at";

/// Fetches a product on any executor (the pool, or an open unit of work).
pub(crate) async fn fetch_product<'e, E>(executor: E, id: i64) -> DbResult<Option<Product>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.search("indomie").await?;
/// let product = repo.get_by_id(42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Every product, active or not, in catalog order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products whose name, SKU or barcode contains `query`.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        debug!(query = %query, "Searching products");

        let products = if query.is_empty() {
            sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            let pattern = format!("%{}%", escape_like(&query));
            sqlx::query_as::<_, Product>(&format!(
                r#"
                SELECT {PRODUCT_COLUMNS} FROM products
                WHERE is_active = 1
                  AND (name LIKE ?1 ESCAPE '\' OR sku LIKE ?1 ESCAPE '\' OR barcode LIKE ?1 ESCAPE '\')
                ORDER BY name
                "#
            ))
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?
        };

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Active products with a threshold whose stock has fallen to it.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE is_active = 1
              AND min_stock_alert IS NOT NULL
              AND stock_quantity <= min_stock_alert
            ORDER BY stock_quantity, id
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a product. Digital products also get a zero balance row.
    pub async fn create(&self, input: &CreateProductInput) -> DbResult<Product> {
        input.validate()?;
        debug!(name = %input.name, product_type = ?input.product_type, "Creating product");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, sku, barcode, product_type, category,
                cost_price_cents, selling_price_cents, stock_quantity, min_stock_alert,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?10)
            "#,
        )
        .bind(input.name.trim())
        .bind(input.sku.as_deref())
        .bind(input.barcode.as_deref())
        .bind(input.product_type)
        .bind(input.category.as_deref())
        .bind(input.cost_price_cents)
        .bind(input.selling_price_cents)
        .bind(input.stock_quantity)
        .bind(input.min_stock_alert)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();

        if input.product_type == ProductType::Digital {
            open_balance(&mut tx, id).await?;
        }

        let product = fetch_product(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await?;

        info!(product_id = id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Applies the fields present in `input`.
    ///
    /// Nullable columns (`sku`, `barcode`, `category`, `min_stock_alert`)
    /// are cleared by an explicit `null` and left alone when absent.
    pub async fn update(&self, input: &UpdateProductInput) -> DbResult<Product> {
        input.validate()?;
        debug!(product_id = input.id, "Updating product");

        let mut tx = self.pool.begin().await?;

        let mut product = fetch_product(&mut *tx, input.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", input.id))?;

        apply_update(&mut product, input);
        product.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE products SET
                name = ?2, sku = ?3, barcode = ?4, product_type = ?5, category = ?6,
                cost_price_cents = ?7, selling_price_cents = ?8,
                stock_quantity = ?9, min_stock_alert = ?10,
                is_active = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(product.product_type)
        .bind(&product.category)
        .bind(product.cost_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.stock_quantity)
        .bind(product.min_stock_alert)
        .bind(product.is_active)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        // A product switched to digital needs its balance row.
        if product.product_type == ProductType::Digital {
            open_balance(&mut tx, product.id).await?;
        }

        tx.commit().await?;

        info!(product_id = product.id, "Product updated");
        Ok(product)
    }
}

/// Creates a zero balance row for `product_id` unless one exists.
async fn open_balance(tx: &mut sqlx::Transaction<'_, Sqlite>, product_id: i64) -> DbResult<()> {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO digital_balances (product_id, balance_cents, created_at, updated_at)
        VALUES (?1, 0, ?2, ?2)
        "#,
    )
    .bind(product_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn apply_update(product: &mut Product, input: &UpdateProductInput) {
    if let Some(name) = &input.name {
        product.name = name.trim().to_string();
    }
    if let Some(sku) = &input.sku {
        product.sku = sku.clone();
    }
    if let Some(barcode) = &input.barcode {
        product.barcode = barcode.clone();
    }
    if let Some(product_type) = input.product_type {
        product.product_type = product_type;
    }
    if let Some(category) = &input.category {
        product.category = category.clone();
    }
    if let Some(cost) = input.cost_price_cents {
        product.cost_price_cents = cost;
    }
    if let Some(price) = input.selling_price_cents {
        product.selling_price_cents = price;
    }
    if let Some(stock) = input.stock_quantity {
        product.stock_quantity = stock;
    }
    if let Some(min) = input.min_stock_alert {
        product.min_stock_alert = min;
    }
    if let Some(active) = input.is_active {
        product.is_active = active;
    }
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn physical(name: &str, sku: Option<&str>, stock: i64, min: Option<i64>) -> CreateProductInput {
        CreateProductInput {
            name: name.to_string(),
            sku: sku.map(str::to_string),
            barcode: None,
            product_type: ProductType::Physical,
            category: Some("Sembako".to_string()),
            cost_price_cents: 250_000,
            selling_price_cents: 350_000,
            stock_quantity: stock,
            min_stock_alert: min,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup().await;
        let created = db
            .products()
            .create(&physical("Indomie Goreng", Some("IDM-GRG"), 100, Some(10)))
            .await
            .unwrap();

        let found = db.products().get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Indomie Goreng");
        assert_eq!(found.product_type, ProductType::Physical);
        assert_eq!(found.stock_quantity, 100);
        assert_eq!(found.selling_price_cents, 350_000);
        assert!(found.is_active);

        assert!(db.products().get_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_digital_product_opens_zero_balance() {
        let db = setup().await;
        let mut input = physical("Pulsa 10k", None, 0, None);
        input.product_type = ProductType::Digital;
        let product = db.products().create(&input).await.unwrap();

        let balance = db
            .digital_balances()
            .get_by_product(product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(balance.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_physical_product_has_no_balance() {
        let db = setup().await;
        let product = db
            .products()
            .create(&physical("Teh Botol", None, 24, None))
            .await
            .unwrap();

        assert!(db
            .digital_balances()
            .get_by_product(product.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_active_only() {
        let db = setup().await;
        let repo = db.products();
        repo.create(&physical("Indomie Goreng", Some("IDM-GRG"), 10, None)).await.unwrap();
        repo.create(&physical("Teh Botol", Some("INDO-TB"), 10, None)).await.unwrap();
        let gone = repo.create(&physical("Indomie Soto", None, 10, None)).await.unwrap();
        repo.create(&physical("Gula Pasir", None, 10, None)).await.unwrap();

        repo.update(&UpdateProductInput {
            id: gone.id,
            is_active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

        let names: Vec<String> = repo
            .search("  INDO ")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Indomie Goreng", "Teh Botol"]);

        assert_eq!(repo.search("").await.unwrap().len(), 3);
        assert!(repo.search("100%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = setup().await;
        let repo = db.products();
        let at_threshold = repo.create(&physical("Beras 5kg", None, 5, Some(5))).await.unwrap();
        repo.create(&physical("Minyak 1L", None, 6, Some(5))).await.unwrap();
        repo.create(&physical("Kecap", None, 0, None)).await.unwrap();
        let inactive = repo.create(&physical("Sabun", None, 1, Some(3))).await.unwrap();
        repo.update(&UpdateProductInput {
            id: inactive.id,
            is_active: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

        let low = repo.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, at_threshold.id);
    }

    #[tokio::test]
    async fn test_update_clears_and_keeps_fields() {
        let db = setup().await;
        let product = db
            .products()
            .create(&physical("Kopi Kapal Api", Some("KKA-165"), 12, Some(4)))
            .await
            .unwrap();

        let input: UpdateProductInput = serde_json::from_value(serde_json::json!({
            "id": product.id,
            "sku": null,
            "selling_price_cents": 400000
        }))
        .unwrap();
        let updated = db.products().update(&input).await.unwrap();

        assert_eq!(updated.sku, None);
        assert_eq!(updated.selling_price_cents, 400_000);
        assert_eq!(updated.category.as_deref(), Some("Sembako"));
        assert_eq!(updated.min_stock_alert, Some(4));

        let reread = db.products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(reread.sku, None);
        assert_eq!(reread.selling_price_cents, 400_000);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = setup().await;
        let err = db
            .products()
            .update(&UpdateProductInput {
                id: 404,
                name: Some("Hantu".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("teh"), "teh");
    }
}
