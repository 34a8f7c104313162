//! # Digital Balance Repository
//!
//! The float behind digital products (phone credit, e-wallet top-ups).
//! Sales draw it down inside the transaction processor; this repository
//! reads it and lets an admin set it outright after a supplier top-up.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::product::fetch_product;
use kasir_core::input::UpdateDigitalBalanceInput;
use kasir_core::{DigitalBalance, ProductType, ValidationError};

const BALANCE_COLUMNS: &str = "id, product_id, balance_cents, created_at, updated_at";

pub(crate) async fn fetch_balance<'e, E>(executor: E, product_id: i64) -> DbResult<Option<DigitalBalance>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let balance = sqlx::query_as::<_, DigitalBalance>(&format!(
        "SELECT {BALANCE_COLUMNS} FROM digital_balances WHERE product_id = ?1"
    ))
    .bind(product_id)
    .fetch_optional(executor)
    .await?;

    Ok(balance)
}

#[derive(Debug, Clone)]
pub struct DigitalBalanceRepository {
    pool: SqlitePool,
}

impl DigitalBalanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DigitalBalanceRepository { pool }
    }

    pub async fn get_by_product(&self, product_id: i64) -> DbResult<Option<DigitalBalance>> {
        fetch_balance(&self.pool, product_id).await
    }

    /// Balances of products that still exist.
    pub async fn list(&self) -> DbResult<Vec<DigitalBalance>> {
        let balances = sqlx::query_as::<_, DigitalBalance>(
            r#"
            SELECT b.id, b.product_id, b.balance_cents, b.created_at, b.updated_at
            FROM digital_balances b
            INNER JOIN products p ON p.id = b.product_id
            ORDER BY b.product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }

    /// Sets the balance of a digital product, creating the row if needed.
    ///
    /// ## Errors
    /// * `NotFound` - no such product
    /// * `Domain(Validation)` - negative balance, or the product is physical
    pub async fn set_balance(&self, input: &UpdateDigitalBalanceInput) -> DbResult<DigitalBalance> {
        input.validate()?;
        debug!(product_id = input.product_id, balance_cents = input.balance_cents, "Setting digital balance");

        let mut tx = self.pool.begin().await?;

        let product = fetch_product(&mut *tx, input.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", input.product_id))?;

        if product.product_type != ProductType::Digital {
            warn!(product_id = product.id, "Balance update rejected for physical product");
            return Err(ValidationError::NotAllowed {
                field: "product_id".to_string(),
                reason: format!("{} is not a digital product", product.name),
            }
            .into());
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO digital_balances (product_id, balance_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT (product_id) DO UPDATE SET
                balance_cents = excluded.balance_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.balance_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let balance = fetch_balance(&mut *tx, input.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("DigitalBalance", input.product_id))?;

        tx.commit().await?;

        info!(product_id = input.product_id, balance_cents = balance.balance_cents, "Digital balance set");
        Ok(balance)
    }
}
