//! # Report Repository
//!
//! Fetches the sold lines of a period and hands them to the aggregation in
//! `kasir_core::report`. Read-only.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kasir_core::report::{
    profit_summary, sales_by_day, top_products, ProfitReport, ReportPeriod, SalesReportRow,
    SoldLine, TopProductRow,
};

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Every transaction line created inside `period`, joined with the
    /// product's current name and cost price.
    pub async fn sold_lines(&self, period: &ReportPeriod) -> DbResult<Vec<SoldLine>> {
        let lines = sqlx::query_as::<_, SoldLine>(
            r#"
            SELECT
                t.id                AS transaction_id,
                t.created_at        AS created_at,
                i.product_id        AS product_id,
                p.name              AS product_name,
                i.quantity          AS quantity,
                i.total_price_cents AS total_price_cents,
                p.cost_price_cents  AS cost_price_cents,
                i.is_digital_sale   AS is_digital_sale
            FROM transactions t
            INNER JOIN transaction_items i ON i.transaction_id = t.id
            INNER JOIN products p ON p.id = i.product_id
            WHERE t.created_at >= ?1 AND t.created_at <= ?2
            ORDER BY t.created_at, i.id
            "#,
        )
        .bind(period.starts_at())
        .bind(period.ends_at())
        .fetch_all(&self.pool)
        .await?;

        debug!(
            start = %period.start,
            end = %period.end,
            lines = lines.len(),
            "Loaded sold lines for report"
        );
        Ok(lines)
    }

    pub async fn sales(&self, period: &ReportPeriod) -> DbResult<Vec<SalesReportRow>> {
        let lines = self.sold_lines(period).await?;
        Ok(sales_by_day(&lines))
    }

    pub async fn profit(&self, period: &ReportPeriod) -> DbResult<ProfitReport> {
        let lines = self.sold_lines(period).await?;
        Ok(profit_summary(&lines))
    }

    pub async fn top_products(&self, period: &ReportPeriod) -> DbResult<Vec<TopProductRow>> {
        let lines = self.sold_lines(period).await?;
        Ok(top_products(&lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{TimeZone, Utc};
    use kasir_core::input::{CartLineInput, CreateProductInput, CreateTransactionInput};
    use kasir_core::{PaymentMethod, ProductType, DEFAULT_ACTING_USER_ID};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, cost_units: i64, price_units: i64) -> i64 {
        db.products()
            .create(&CreateProductInput {
                name: name.to_string(),
                sku: None,
                barcode: None,
                product_type: ProductType::Physical,
                category: None,
                cost_price_cents: cost_units * 100,
                selling_price_cents: price_units * 100,
                stock_quantity: 100,
                min_stock_alert: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn sell(db: &Database, items: Vec<(i64, i64, i64)>) -> i64 {
        let items = items
            .into_iter()
            .map(|(product_id, quantity, price_units)| CartLineInput {
                product_id,
                quantity,
                unit_price_cents: price_units * 100,
                is_digital_sale: false,
            })
            .collect();

        db.transactions()
            .create(
                &CreateTransactionInput {
                    items,
                    payment_method: PaymentMethod::Digital,
                    payment_received_cents: None,
                    notes: None,
                },
                DEFAULT_ACTING_USER_ID,
            )
            .await
            .unwrap()
            .id
    }

    async fn backdate(db: &Database, transaction_id: i64, at: chrono::DateTime<Utc>) {
        sqlx::query("UPDATE transactions SET created_at = ?2 WHERE id = ?1")
            .bind(transaction_id)
            .bind(at)
            .execute(db.pool())
            .await
            .unwrap();
    }

    fn today() -> ReportPeriod {
        let date = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        ReportPeriod::parse(&date, &date).unwrap()
    }

    #[tokio::test]
    async fn test_profit_report() {
        let db = setup().await;
        let a = product(&db, "Kopi Sachet", 10, 15).await;
        let b = product(&db, "Susu Kotak", 20, 35).await;
        sell(&db, vec![(a, 3, 15), (b, 2, 35)]).await;

        let report = db.reports().profit(&today()).await.unwrap();
        assert_eq!(report.total_revenue_cents, 9_500);
        assert_eq!(report.total_profit_cents, 2_500);
        assert_eq!(report.profit_margin_bps, 2_632);
    }

    #[tokio::test]
    async fn test_empty_period() {
        let db = setup().await;
        let period = ReportPeriod::parse("2020-01-01", "2020-01-31").unwrap();

        assert!(db.reports().sales(&period).await.unwrap().is_empty());
        assert!(db.reports().top_products(&period).await.unwrap().is_empty());

        let profit = db.reports().profit(&period).await.unwrap();
        assert_eq!(profit.total_revenue_cents, 0);
        assert_eq!(profit.profit_margin_bps, 0);
    }

    #[tokio::test]
    async fn test_period_is_inclusive_of_whole_end_day() {
        let db = setup().await;
        let a = product(&db, "Roti Tawar", 10, 15).await;

        let early = sell(&db, vec![(a, 1, 15)]).await;
        let late = sell(&db, vec![(a, 2, 15)]).await;
        let outside = sell(&db, vec![(a, 4, 15)]).await;

        backdate(&db, early, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()).await;
        backdate(
            &db,
            late,
            Utc.with_ymd_and_hms(2024, 3, 2, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999),
        )
        .await;
        backdate(&db, outside, Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap()).await;

        let period = ReportPeriod::parse("2024-03-01", "2024-03-02").unwrap();
        let rows = db.reports().sales(&period).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date.to_string(), "2024-03-01");
        assert_eq!(rows[0].total_revenue_cents, 1_500);
        assert_eq!(rows[1].date.to_string(), "2024-03-02");
        assert_eq!(rows[1].total_transactions, 1);
        assert_eq!(rows[1].total_revenue_cents, 3_000);
    }

    #[tokio::test]
    async fn test_top_products() {
        let db = setup().await;
        let a = product(&db, "Gula", 10, 12).await;
        let b = product(&db, "Garam", 2, 3).await;
        let c = product(&db, "Teh", 4, 5).await;

        sell(&db, vec![(a, 2, 12), (b, 5, 3)]).await;
        sell(&db, vec![(c, 5, 5), (a, 1, 12)]).await;

        let rows = db.reports().top_products(&today()).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.product_id).collect();
        assert_eq!(ids, vec![b, c, a]);
        assert_eq!(rows[2].total_quantity, 3);
        assert_eq!(rows[2].total_revenue_cents, 3_600);
        assert_eq!(rows[0].product_name, "Garam");
    }
}
