//! # Reporting Aggregates
//!
//! Pure aggregation over sold lines. kasir-db fetches every line sold inside
//! a [`ReportPeriod`] (transaction ⨝ item ⨝ product) and hands the rows to
//! the functions here.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  "2024-01-01" .. "2024-01-31"                                          │
//! │       │ ReportPeriod::parse                                             │
//! │       ▼                                                                 │
//! │  [2024-01-01T00:00:00.000Z, 2024-01-31T23:59:59.999Z]                  │
//! │       │ kasir-db: SELECT … WHERE created_at BETWEEN …                  │
//! │       ▼                                                                 │
//! │  Vec<SoldLine> ──┬──► sales_by_day()    → Vec<SalesReportRow>          │
//! │                  ├──► profit_summary()  → ProfitReport                 │
//! │                  └──► top_products()    → Vec<TopProductRow>           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line profit uses the product's *current* cost price:
//! `total_price − quantity × cost_price`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{parse_date, ValidationResult};

// =============================================================================
// Period
// =============================================================================

/// An inclusive range of calendar days, interpreted in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    /// Parses two `YYYY-MM-DD` strings. `start` after `end` is rejected.
    pub fn parse(start_date: &str, end_date: &str) -> ValidationResult<Self> {
        let start = parse_date("start_date", start_date)?;
        let end = parse_date("end_date", end_date)?;

        if start > end {
            return Err(ValidationError::NotAllowed {
                field: "start_date".to_string(),
                reason: "must not be after end_date".to_string(),
            });
        }

        Ok(ReportPeriod { start, end })
    }

    /// `start` at 00:00:00.000 UTC.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// `end` at 23:59:59.999 UTC.
    pub fn ends_at(&self) -> DateTime<Utc> {
        let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        self.end.and_time(last_milli).and_utc()
    }
}

/// Query-string input of the three report procedures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPeriodInput {
    pub start_date: String,
    pub end_date: String,
}

impl ReportPeriodInput {
    pub fn period(&self) -> ValidationResult<ReportPeriod> {
        ReportPeriod::parse(&self.start_date, &self.end_date)
    }
}

// =============================================================================
// Source Rows
// =============================================================================

/// One transaction item joined with its transaction and product.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SoldLine {
    pub transaction_id: i64,
    pub created_at: DateTime<Utc>,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub total_price_cents: i64,
    pub cost_price_cents: i64,
    pub is_digital_sale: bool,
}

impl SoldLine {
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_price_cents).multiply_quantity(self.quantity)
    }

    pub fn profit(&self) -> Money {
        self.revenue() - self.cost()
    }
}

// =============================================================================
// Report Rows
// =============================================================================

/// Sales for one calendar day with activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReportRow {
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Distinct transactions that day.
    pub total_transactions: i64,
    pub total_revenue_cents: i64,
    pub total_profit_cents: i64,
    /// Revenue of lines with `is_digital_sale = false`.
    pub physical_sales_cents: i64,
    /// Revenue of lines with `is_digital_sale = true`.
    pub digital_sales_cents: i64,
}

/// Profit summary for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfitReport {
    pub total_profit_cents: i64,
    pub total_revenue_cents: i64,
    /// Percentage × 100, rounded: 2632 means 26.32%.
    pub profit_margin_bps: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProductRow {
    pub product_id: i64,
    pub product_name: String,
    pub total_quantity: i64,
    pub total_revenue_cents: i64,
}

// =============================================================================
// Aggregation
// =============================================================================

#[derive(Default)]
struct DayTotals {
    transactions: BTreeSet<i64>,
    revenue: Money,
    profit: Money,
    physical: Money,
    digital: Money,
}

/// One row per day with sales, ascending by date.
pub fn sales_by_day(lines: &[SoldLine]) -> Vec<SalesReportRow> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();

    for line in lines {
        let day = days.entry(line.created_at.date_naive()).or_default();
        day.transactions.insert(line.transaction_id);
        day.revenue += line.revenue();
        day.profit += line.profit();
        if line.is_digital_sale {
            day.digital += line.revenue();
        } else {
            day.physical += line.revenue();
        }
    }

    days.into_iter()
        .map(|(date, day)| SalesReportRow {
            date,
            total_transactions: day.transactions.len() as i64,
            total_revenue_cents: day.revenue.cents(),
            total_profit_cents: day.profit.cents(),
            physical_sales_cents: day.physical.cents(),
            digital_sales_cents: day.digital.cents(),
        })
        .collect()
}

/// Revenue, profit and margin over all lines.
pub fn profit_summary(lines: &[SoldLine]) -> ProfitReport {
    let revenue: Money = lines.iter().map(SoldLine::revenue).sum();
    let profit: Money = lines.iter().map(SoldLine::profit).sum();

    ProfitReport {
        total_profit_cents: profit.cents(),
        total_revenue_cents: revenue.cents(),
        profit_margin_bps: margin_bps(profit, revenue),
    }
}

/// `profit / revenue` in basis points, rounded half away from zero.
/// Zero when there is no positive revenue.
pub fn margin_bps(profit: Money, revenue: Money) -> i64 {
    if !revenue.is_positive() {
        return 0;
    }

    let numerator = profit.cents() as i128 * 10_000;
    let denominator = revenue.cents() as i128;

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    let rounded = if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    };

    rounded as i64
}

/// Products by quantity sold, highest first. Ties go to the lower product id.
pub fn top_products(lines: &[SoldLine]) -> Vec<TopProductRow> {
    let mut by_product: BTreeMap<i64, TopProductRow> = BTreeMap::new();

    for line in lines {
        let row = by_product.entry(line.product_id).or_insert_with(|| TopProductRow {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            total_quantity: 0,
            total_revenue_cents: 0,
        });
        row.total_quantity += line.quantity;
        row.total_revenue_cents += line.total_price_cents;
    }

    let mut rows: Vec<TopProductRow> = by_product.into_values().collect();
    rows.sort_by(|a, b| {
        b.total_quantity
            .cmp(&a.total_quantity)
            .then(a.product_id.cmp(&b.product_id))
    });
    rows
}

// =============================================================================
// Unit Tests
// =============================================================================
