//! # Transaction Repository
//!
//! Home of the transaction processor: one sale, one unit of work.
//!
//! ## Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create() - all or nothing                            │
//! │                                                                         │
//! │  price_cart(input)          total, change, payment check (no I/O)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │   ├── INSERT transactions (header, takes the write lock)               │
//! │   │                                                                     │
//! │   ├── for each line, in cart order:                                    │
//! │   │     fetch product ─────────────── missing → ProductNotFound        │
//! │   │     Fulfillment::for_line                                           │
//! │   │       DeductStock   ensure_stock   ─ short → InsufficientStock     │
//! │   │       DeductBalance ensure_balance ─ short → InsufficientBalance   │
//! │   │     INSERT transaction_items                                        │
//! │   │     guarded UPDATE … SET x = x − ? WHERE … AND x >= ?              │
//! │   │       0 rows affected → lost a race → Insufficient*                │
//! │   │                                                                     │
//! │  COMMIT  (any error above drops `tx` → ROLLBACK)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are checked against state already changed by earlier lines of the
//! same cart, so the same product twice cannot oversell.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::digital_balance::fetch_balance;
use crate::repository::product::fetch_product;
use kasir_core::checkout::{
    ensure_balance, ensure_stock, generate_transaction_number, price_cart, Fulfillment, PricedLine,
};
use kasir_core::input::CreateTransactionInput;
use kasir_core::{CoreError, Money, Product, Transaction, TransactionDetail, TransactionItem};

const TRANSACTION_COLUMNS: &str = "id, transaction_number, user_id, total_amount_cents, \
     payment_method, payment_received_cents, change_amount_cents, notes, created_at";

const ITEM_COLUMNS: &str = "id, transaction_id, product_id, quantity, unit_price_cents, \
     total_price_cents, is_digital_sale, created_at";

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Records a sale and applies its stock and balance effects atomically.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - empty cart, non-positive quantity/price, cash without amount
    /// * `Domain(InsufficientPayment)` - cash received below total
    /// * `Domain(ProductNotFound)` - unknown product on a line
    /// * `Domain(InsufficientStock)` / `Domain(InsufficientBalance)`
    /// * `NotFound` - digital product without a balance row
    ///
    /// On any error nothing is written.
    pub async fn create(
        &self,
        input: &CreateTransactionInput,
        acting_user_id: i64,
    ) -> DbResult<Transaction> {
        let cart = price_cart(input).inspect_err(|e| warn!(error = %e, "Checkout rejected"))?;

        let now = Utc::now();
        let number = generate_transaction_number(now);

        debug!(
            transaction_number = %number,
            lines = cart.lines.len(),
            total = %cart.total,
            "Processing transaction"
        );

        let mut tx = self.pool.begin().await?;

        let header = sqlx::query(
            r#"
            INSERT INTO transactions (
                transaction_number, user_id, total_amount_cents, payment_method,
                payment_received_cents, change_amount_cents, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&number)
        .bind(acting_user_id)
        .bind(cart.total.cents())
        .bind(cart.payment_method)
        .bind(cart.payment_received.map(|m| m.cents()))
        .bind(cart.change.map(|m| m.cents()))
        .bind(input.notes.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let transaction_id = header.last_insert_rowid();

        for line in &cart.lines {
            sell_line(&mut tx, transaction_id, line, now)
                .await
                .inspect_err(|e| warn!(product_id = line.product_id, error = %e, "Transaction rolled back"))?;
        }

        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            transaction_id,
            transaction_number = %transaction.transaction_number,
            total = %cart.total,
            "Transaction committed"
        );
        Ok(transaction)
    }

    /// All transactions, newest first.
    pub async fn list(&self) -> DbResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Lines of a transaction in the order they were rung up.
    pub async fn get_items(&self, transaction_id: i64) -> DbResult<Vec<TransactionItem>> {
        let items = sqlx::query_as::<_, TransactionItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM transaction_items WHERE transaction_id = ?1 ORDER BY id"
        ))
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Header plus lines.
    pub async fn get_detail(&self, id: i64) -> DbResult<TransactionDetail> {
        let transaction = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", id))?;
        let items = self.get_items(id).await?;

        Ok(TransactionDetail { transaction, items })
    }
}

// =============================================================================
// Line Processing
// =============================================================================

async fn sell_line(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    transaction_id: i64,
    line: &PricedLine,
    now: chrono::DateTime<Utc>,
) -> DbResult<()> {
    let product = fetch_product(&mut **tx, line.product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(line.product_id))?;

    let fulfillment = Fulfillment::for_line(product.product_type, line.is_digital_sale);

    let balance = match fulfillment {
        Fulfillment::DeductStock => {
            ensure_stock(&product, line.quantity)?;
            None
        }
        Fulfillment::DeductBalance => {
            let balance = fetch_balance(&mut **tx, product.id)
                .await?
                .ok_or_else(|| DbError::not_found("DigitalBalance", product.id))?;
            ensure_balance(&product, balance.balance(), line.total_price)?;
            Some(balance.balance())
        }
        Fulfillment::Untracked => None,
    };

    sqlx::query(
        r#"
        INSERT INTO transaction_items (
            transaction_id, product_id, quantity, unit_price_cents,
            total_price_cents, is_digital_sale, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(transaction_id)
    .bind(line.product_id)
    .bind(line.quantity)
    .bind(line.unit_price.cents())
    .bind(line.total_price.cents())
    .bind(line.is_digital_sale)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    match fulfillment {
        Fulfillment::DeductStock => deduct_stock(tx, &product, line.quantity, now).await,
        Fulfillment::DeductBalance => {
            let available = balance.unwrap_or_default();
            deduct_balance(tx, &product, available, line.total_price, now).await
        }
        Fulfillment::Untracked => Ok(()),
    }
}

async fn deduct_stock(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    product: &Product,
    quantity: i64,
    now: chrono::DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?2, updated_at = ?3
        WHERE id = ?1 AND stock_quantity >= ?2
        "#,
    )
    .bind(product.id)
    .bind(quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock_quantity,
            required: quantity,
        }
        .into());
    }

    Ok(())
}

async fn deduct_balance(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    product: &Product,
    available: Money,
    amount: Money,
    now: chrono::DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE digital_balances
        SET balance_cents = balance_cents - ?2, updated_at = ?3
        WHERE product_id = ?1 AND balance_cents >= ?2
        "#,
    )
    .bind(product.id)
    .bind(amount.cents())
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::InsufficientBalance {
            product: product.name.clone(),
            available,
            required: amount,
        }
        .into());
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kasir_core::input::{CartLineInput, CreateProductInput, UpdateDigitalBalanceInput};
    use kasir_core::{PaymentMethod, ProductType, DEFAULT_ACTING_USER_ID};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn physical(db: &Database, name: &str, stock: i64) -> i64 {
        db.products()
            .create(&CreateProductInput {
                name: name.to_string(),
                sku: None,
                barcode: None,
                product_type: ProductType::Physical,
                category: None,
                cost_price_cents: 1_000,
                selling_price_cents: 1_500,
                stock_quantity: stock,
                min_stock_alert: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn digital(db: &Database, name: &str, balance_cents: i64) -> i64 {
        let id = db
            .products()
            .create(&CreateProductInput {
                name: name.to_string(),
                sku: None,
                barcode: None,
                product_type: ProductType::Digital,
                category: None,
                cost_price_cents: 1_000,
                selling_price_cents: 1_000,
                stock_quantity: 0,
                min_stock_alert: None,
            })
            .await
            .unwrap()
            .id;
        db.digital_balances()
            .set_balance(&UpdateDigitalBalanceInput { product_id: id, balance_cents })
            .await
            .unwrap();
        id
    }

    fn line(product_id: i64, quantity: i64, unit_price_cents: i64, is_digital_sale: bool) -> CartLineInput {
        CartLineInput {
            product_id,
            quantity,
            unit_price_cents,
            is_digital_sale,
        }
    }

    fn cash(items: Vec<CartLineInput>, received: i64) -> CreateTransactionInput {
        CreateTransactionInput {
            items,
            payment_method: PaymentMethod::Cash,
            payment_received_cents: Some(received),
            notes: None,
        }
    }

    fn digital_payment(items: Vec<CartLineInput>) -> CreateTransactionInput {
        CreateTransactionInput {
            items,
            payment_method: PaymentMethod::Digital,
            payment_received_cents: None,
            notes: None,
        }
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock_quantity
    }

    async fn balance_of(db: &Database, id: i64) -> i64 {
        db.digital_balances()
            .get_by_product(id)
            .await
            .unwrap()
            .unwrap()
            .balance_cents
    }

    async fn row_count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cash_sale_records_everything() {
        let db = setup().await;
        let a = physical(&db, "Indomie Goreng", 100).await;
        let b = physical(&db, "Teh Botol", 50).await;

        let trx = db
            .transactions()
            .create(
                &cash(vec![line(a, 3, 1_500, false), line(b, 2, 3_500, false)], 20_000),
                DEFAULT_ACTING_USER_ID,
            )
            .await
            .unwrap();

        assert_eq!(trx.total_amount_cents, 11_500);
        assert_eq!(trx.payment_method, PaymentMethod::Cash);
        assert_eq!(trx.payment_received_cents, Some(20_000));
        assert_eq!(trx.change_amount_cents, Some(8_500));
        assert_eq!(trx.user_id, DEFAULT_ACTING_USER_ID);
        assert!(trx.transaction_number.starts_with("TRX-"));

        assert_eq!(stock_of(&db, a).await, 97);
        assert_eq!(stock_of(&db, b).await, 48);

        let detail = db.transactions().get_detail(trx.id).await.unwrap();
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].product_id, a);
        assert_eq!(detail.items[0].total_price_cents, 4_500);
        assert_eq!(detail.items[1].total_price_cents, 7_000);
        let sum: i64 = detail.items.iter().map(|i| i.total_price_cents).sum();
        assert_eq!(sum, trx.total_amount_cents);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = setup().await;
        let id = physical(&db, "Indomie Goreng", 100).await;

        let err = db
            .transactions()
            .create(&digital_payment(vec![line(id, 150, 1_500, false)]), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 100,
                required: 150,
                ..
            })
        ));
        assert_eq!(stock_of(&db, id).await, 100);
        assert_eq!(row_count(&db, "transactions").await, 0);
        assert_eq!(row_count(&db, "transaction_items").await, 0);
    }

    #[tokio::test]
    async fn test_insufficient_balance_keeps_balance() {
        let db = setup().await;
        let id = digital(&db, "Pulsa", 100_000).await;

        let err = db
            .transactions()
            .create(&digital_payment(vec![line(id, 2, 100_000, true)]), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientBalance { available, required, .. }) => {
                assert_eq!(available, Money::from_cents(100_000));
                assert_eq!(required, Money::from_cents(200_000));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(balance_of(&db, id).await, 100_000);
        assert_eq!(row_count(&db, "transactions").await, 0);
    }

    #[tokio::test]
    async fn test_digital_sale_draws_down_balance() {
        let db = setup().await;
        let id = digital(&db, "Pulsa 10k", 500_000).await;

        let trx = db
            .transactions()
            .create(&digital_payment(vec![line(id, 3, 11_000, true)]), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap();

        assert_eq!(trx.payment_received_cents, None);
        assert_eq!(trx.change_amount_cents, None);
        assert_eq!(balance_of(&db, id).await, 500_000 - 33_000);
    }

    #[tokio::test]
    async fn test_mixed_cart_is_all_or_nothing() {
        let db = setup().await;
        let goods = physical(&db, "Kopi", 10).await;
        let credit = digital(&db, "E-Wallet", 1_000).await;

        let err = db
            .transactions()
            .create(
                &cash(vec![line(goods, 2, 1_500, false), line(credit, 1, 5_000, true)], 10_000),
                DEFAULT_ACTING_USER_ID,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::InsufficientBalance { .. })));
        assert_eq!(stock_of(&db, goods).await, 10);
        assert_eq!(balance_of(&db, credit).await, 1_000);
        assert_eq!(row_count(&db, "transaction_items").await, 0);

        db.transactions()
            .create(
                &cash(vec![line(goods, 2, 1_500, false), line(credit, 1, 1_000, true)], 10_000),
                DEFAULT_ACTING_USER_ID,
            )
            .await
            .unwrap();
        assert_eq!(stock_of(&db, goods).await, 8);
        assert_eq!(balance_of(&db, credit).await, 0);
    }

    #[tokio::test]
    async fn test_repeated_product_sees_earlier_lines() {
        let db = setup().await;
        let id = physical(&db, "Roti", 5).await;

        let err = db
            .transactions()
            .create(
                &digital_payment(vec![line(id, 3, 1_500, false), line(id, 3, 1_500, false)]),
                DEFAULT_ACTING_USER_ID,
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 2,
                required: 3,
                ..
            })
        ));
        assert_eq!(stock_of(&db, id).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let db = setup().await;
        let err = db
            .transactions()
            .create(&digital_payment(vec![line(31337, 1, 1_000, false)]), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(31337))));
        assert_eq!(row_count(&db, "transactions").await, 0);
    }

    #[tokio::test]
    async fn test_short_cash_is_rejected_before_writing() {
        let db = setup().await;
        let id = physical(&db, "Susu", 10).await;

        let err = db
            .transactions()
            .create(&cash(vec![line(id, 1, 9_500, false)], 9_000), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::InsufficientPayment { .. })));
        assert_eq!(stock_of(&db, id).await, 10);
    }

    #[tokio::test]
    async fn test_overflowing_line_total_is_rejected_before_writing() {
        let db = setup().await;
        let id = digital(&db, "Token Listrik", 100_000).await;

        let err = db
            .transactions()
            .create(
                &digital_payment(vec![line(id, 2, i64::MAX / 2 + 1, true)]),
                DEFAULT_ACTING_USER_ID,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(balance_of(&db, id).await, 100_000);
        assert_eq!(row_count(&db, "transactions").await, 0);
    }

    #[tokio::test]
    async fn test_cross_type_lines_have_no_side_effect() {
        let db = setup().await;
        let goods = physical(&db, "Voucher Fisik", 4).await;
        let credit = digital(&db, "Pulsa", 2_000).await;

        db.transactions()
            .create(
                &digital_payment(vec![line(goods, 1, 1_000, true), line(credit, 1, 1_000, false)]),
                DEFAULT_ACTING_USER_ID,
            )
            .await
            .unwrap();

        assert_eq!(stock_of(&db, goods).await, 4);
        assert_eq!(balance_of(&db, credit).await, 2_000);
    }

    #[tokio::test]
    async fn test_digital_product_without_balance_row() {
        let db = setup().await;
        let id = digital(&db, "Token", 5_000).await;
        sqlx::query("DELETE FROM digital_balances")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .transactions()
            .create(&digital_payment(vec![line(id, 1, 1_000, true)]), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "DigitalBalance"));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_detail_not_found() {
        let db = setup().await;
        let id = physical(&db, "Air Mineral", 10).await;

        let first = db
            .transactions()
            .create(&digital_payment(vec![line(id, 1, 1_000, false)]), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap();
        let second = db
            .transactions()
            .create(&digital_payment(vec![line(id, 1, 1_000, false)]), DEFAULT_ACTING_USER_ID)
            .await
            .unwrap();

        let listed: Vec<i64> = db.transactions().list().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(listed, vec![second.id, first.id]);
        assert_ne!(first.transaction_number, second.transaction_number);

        let err = db.transactions().get_detail(404).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() {
        let path = std::env::temp_dir().join(format!(
            "kasir-oversell-{}-{}.db",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let id = physical(&db, "Promo Item", 5).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                db.transactions()
                    .create(&digital_payment(vec![line(id, 1, 1_000, false)]), DEFAULT_ACTING_USER_ID)
                    .await
            }));
        }

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(sold, 5);
        assert_eq!(stock_of(&db, id).await, 0);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
