//! # Stock Movement Repository
//!
//! Audited stock adjustments. Each movement snapshots the stock before and
//! after, and the product's `stock_quantity` moves with it in the same unit
//! of work.
//!
//! ```text
//!  BEGIN
//!   ├── UPDATE products SET updated_at   takes the write lock,
//!   │                                    0 rows → ProductNotFound
//!   ├── fetch product                    stock can no longer change under us
//!   ├── plan_movement()                  keluar below zero → InsufficientStock
//!   ├── UPDATE products SET stock_quantity = new
//!   └── INSERT stock_movements (previous, new)
//!  COMMIT
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::product::fetch_product;
use kasir_core::input::CreateStockMovementInput;
use kasir_core::stock::plan_movement;
use kasir_core::{CoreError, StockMovement};

const MOVEMENT_COLUMNS: &str = "id, product_id, movement_type, quantity, previous_stock, \
     new_stock, notes, user_id, created_at";

#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Records a movement and applies it to the product's stock.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - quantity rules per movement type
    /// * `Domain(ProductNotFound)`
    /// * `Domain(InsufficientStock)` - `keluar` more than is on hand
    pub async fn create(
        &self,
        input: &CreateStockMovementInput,
        acting_user_id: i64,
    ) -> DbResult<StockMovement> {
        input.validate()?;
        debug!(
            product_id = input.product_id,
            movement_type = ?input.movement_type,
            quantity = input.quantity,
            "Recording stock movement"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Write before reading so the snapshot we plan against is the one we commit on.
        let locked = sqlx::query("UPDATE products SET updated_at = ?2 WHERE id = ?1")
            .bind(input.product_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(input.product_id).into());
        }

        let product = fetch_product(&mut *tx, input.product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(input.product_id))?;

        let change = plan_movement(&product, input.movement_type, input.quantity)
            .inspect_err(|e| warn!(product_id = product.id, error = %e, "Stock movement rejected"))?;

        sqlx::query("UPDATE products SET stock_quantity = ?2 WHERE id = ?1")
            .bind(product.id)
            .bind(change.new_stock)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO stock_movements (
                product_id, movement_type, quantity, previous_stock, new_stock,
                notes, user_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(product.id)
        .bind(input.movement_type)
        .bind(input.quantity)
        .bind(change.previous_stock)
        .bind(change.new_stock)
        .bind(input.notes.as_deref())
        .bind(acting_user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let movement = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = ?1"
        ))
        .bind(result.last_insert_rowid())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            movement_id = movement.id,
            product_id = movement.product_id,
            previous_stock = movement.previous_stock,
            new_stock = movement.new_stock,
            "Stock movement recorded"
        );
        Ok(movement)
    }

    /// All movements, newest first.
    pub async fn list(&self) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use kasir_core::input::CreateProductInput;
    use kasir_core::{ProductType, StockMovementType, DEFAULT_ACTING_USER_ID};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, stock: i64) -> i64 {
        db.products()
            .create(&CreateProductInput {
                name: "Minyak Goreng 2L".to_string(),
                sku: None,
                barcode: None,
                product_type: ProductType::Physical,
                category: None,
                cost_price_cents: 3_000_000,
                selling_price_cents: 3_400_000,
                stock_quantity: stock,
                min_stock_alert: None,
            })
            .await
            .unwrap()
            .id
    }

    fn movement(product_id: i64, movement_type: StockMovementType, quantity: i64) -> CreateStockMovementInput {
        CreateStockMovementInput {
            product_id,
            movement_type,
            quantity,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_in_and_out() {
        let db = setup().await;
        let id = product(&db, 50).await;
        let repo = db.stock_movements();

        let received = repo
            .create(&movement(id, StockMovementType::In, 10), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap();
        assert_eq!((received.previous_stock, received.new_stock), (50, 60));
        assert_eq!(received.user_id, DEFAULT_ACTING_USER_ID);

        let removed = repo
            .create(&movement(id, StockMovementType::Out, 25), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap();
        assert_eq!((removed.previous_stock, removed.new_stock), (60, 35));

        let stock = db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity;
        assert_eq!(stock, 50 + 10 - 25);
    }

    #[tokio::test]
    async fn test_count_adjustment_to_zero() {
        let db = setup().await;
        let id = product(&db, 50).await;

        let counted = db
            .stock_movements()
            .create(&movement(id, StockMovementType::CountAdjustment, 0), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap();

        assert_eq!(counted.previous_stock, 50);
        assert_eq!(counted.new_stock, 0);
        assert_eq!(counted.movement_type, StockMovementType::CountAdjustment);
        assert_eq!(db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_out_beyond_stock_changes_nothing() {
        let db = setup().await;
        let id = product(&db, 5).await;

        let err = db
            .stock_movements()
            .create(&movement(id, StockMovementType::Out, 6), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 5,
                required: 6,
                ..
            })
        ));
        assert_eq!(db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity, 5);
        assert!(db.stock_movements().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = setup().await;
        let err = db
            .stock_movements()
            .create(&movement(808, StockMovementType::In, 1), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(808))));
    }

    #[tokio::test]
    async fn test_zero_quantity_in_is_invalid() {
        let db = setup().await;
        let id = product(&db, 5).await;

        let err = db
            .stock_movements()
            .create(&movement(id, StockMovementType::In, 0), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stock_equals_initial_plus_signed_movements() {
        let db = setup().await;
        let id = product(&db, 20).await;
        let repo = db.stock_movements();

        for (kind, qty) in [
            (StockMovementType::In, 15),
            (StockMovementType::Out, 8),
            (StockMovementType::Out, 12),
            (StockMovementType::In, 4),
        ] {
            repo.create(&movement(id, kind, qty), DEFAULT_ACTING_USER_ID)
                .await
                .unwrap();
        }

        let movements = repo.list().await.unwrap();
        assert_eq!(movements.len(), 4);
        assert_eq!(movements[0].new_stock, 19);
        assert_eq!(movements[3].previous_stock, 20);

        let stock = db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity;
        assert_eq!(stock, 20 + 15 - 8 - 12 + 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_movements_all_apply() {
        let path = std::env::temp_dir().join(format!(
            "kasir-movements-{}-{}.db",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let id = product(&db, 5).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let db = db.clone();
            let kind = if i % 4 == 3 {
                StockMovementType::Out
            } else {
                StockMovementType::In
            };
            handles.push(tokio::spawn(async move {
                db.stock_movements()
                    .create(&movement(id, kind, 1), DEFAULT_ACTING_USER_ID)
                    .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // 15 in, 5 out
        let stock = db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity;
        assert_eq!(stock, 5 + 15 - 5);

        let movements = db.stock_movements().list().await.unwrap();
        assert_eq!(movements.len(), 20);
        for m in &movements {
            let delta = match m.movement_type {
                StockMovementType::In => 1,
                _ => -1,
            };
            assert_eq!(m.new_stock, m.previous_stock + delta);
        }

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
