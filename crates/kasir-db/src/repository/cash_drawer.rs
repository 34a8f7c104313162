//! # Cash Drawer Repository
//!
//! Append-only ledger of cash placed into and taken out of the till. The
//! balance is recomputed from every row on each request.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use kasir_core::cash_drawer::drawer_balance;
use kasir_core::input::CreateCashDrawerInput;
use kasir_core::{CashDrawerBalance, CashDrawerEntry, CashDrawerType, Money};

const ENTRY_COLUMNS: &str = "id, entry_type, amount_cents, description, user_id, created_at";

#[derive(Debug, Clone)]
pub struct CashDrawerRepository {
    pool: SqlitePool,
}

impl CashDrawerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashDrawerRepository { pool }
    }

    pub async fn create(
        &self,
        input: &CreateCashDrawerInput,
        acting_user_id: i64,
    ) -> DbResult<CashDrawerEntry> {
        input.validate()?;

        let result = sqlx::query(
            r#"
            INSERT INTO cash_drawer (entry_type, amount_cents, description, user_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(input.entry_type)
        .bind(input.amount_cents)
        .bind(input.description.trim())
        .bind(acting_user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let entry = sqlx::query_as::<_, CashDrawerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM cash_drawer WHERE id = ?1"
        ))
        .bind(result.last_insert_rowid())
        .fetch_one(&self.pool)
        .await?;

        info!(
            entry_id = entry.id,
            entry_type = ?entry.entry_type,
            amount = %entry.amount(),
            "Cash drawer entry recorded"
        );
        Ok(entry)
    }

    /// Ledger rows, newest first.
    pub async fn list(&self) -> DbResult<Vec<CashDrawerEntry>> {
        let entries = sqlx::query_as::<_, CashDrawerEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM cash_drawer ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Current till balance folded over the whole ledger.
    pub async fn balance(&self) -> DbResult<CashDrawerBalance> {
        let rows: Vec<(CashDrawerType, i64)> =
            sqlx::query_as("SELECT entry_type, amount_cents FROM cash_drawer")
                .fetch_all(&self.pool)
                .await?;

        let balance = drawer_balance(
            rows.into_iter()
                .map(|(entry_type, cents)| (entry_type, Money::from_cents(cents))),
        );
        debug!(balance = %balance, "Cash drawer balance computed");

        Ok(CashDrawerBalance {
            balance_cents: balance.cents(),
        })
    }
}
