//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_type   │◄──│  number (uniq)  │──►│  quantity       │       │
//! │  │  stock_quantity │   │  total_amount   │   │  unit_price     │       │
//! │  │  selling_price  │   │  payment_method │   │  is_digital_sale│       │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │ 1:1 (digital only)                                          │
//! │  ┌────────▼────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ DigitalBalance  │   │  StockMovement  │   │ CashDrawerEntry │       │
//! │  │  balance        │   │  prev → new     │   │  in/out/opening │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Vocabulary
//! Enums are closed Rust types. Their serialized names (JSON and database
//! TEXT) are the words the browser client already uses: `fisik`, `tunai`,
//! `masuk`, `keluar`, `opname`, `saldo_awal`, `kasir`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User
// =============================================================================

/// Role of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum UserRole {
    #[serde(rename = "admin")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "admin"))]
    Admin,
    #[serde(rename = "kasir")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "kasir"))]
    Cashier,
}

/// A staff account. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// How a product is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum ProductType {
    /// Inventory-tracked goods; selling decrements `stock_quantity`.
    #[serde(rename = "fisik")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "fisik"))]
    Physical,
    /// Fulfilled against a [`DigitalBalance`] (phone credit, e-wallet top-up).
    #[serde(rename = "digital")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "digital"))]
    Digital,
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub category: Option<String>,
    /// Purchase cost in cents (drives profit reports).
    pub cost_price_cents: i64,
    /// Shelf price in cents.
    pub selling_price_cents: i64,
    /// Units on hand. Only meaningful for physical products; never negative.
    pub stock_quantity: i64,
    /// Low-stock threshold, if the product is monitored.
    pub min_stock_alert: Option<i64>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// True when the product has a threshold and stock has fallen to it.
    pub fn is_low_stock(&self) -> bool {
        match self.min_stock_alert {
            Some(min) => self.stock_quantity <= min,
            None => false,
        }
    }
}

// =============================================================================
// Digital Balance
// =============================================================================

/// The float backing a digital product. One row per digital product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DigitalBalance {
    pub id: i64,
    pub product_id: i64,
    /// Remaining balance in cents; never negative.
    pub balance_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl DigitalBalance {
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash; requires the amount received and yields change.
    #[serde(rename = "tunai")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "tunai"))]
    Cash,
    /// QR / transfer payment; no change is computed.
    #[serde(rename = "digital")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "digital"))]
    Digital,
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed point-of-sale transaction. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    pub transaction_number: String,
    pub user_id: i64,
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    /// Cash only.
    pub payment_received_cents: Option<i64>,
    /// Cash only: `max(0, received - total)`.
    pub change_amount_cents: Option<i64>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// A line of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// `quantity × unit_price`.
    pub total_price_cents: i64,
    /// Sold against the digital balance rather than physical stock.
    pub is_digital_sale: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Header plus lines, as shown on a receipt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Kind of audited stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum StockMovementType {
    /// Goods received: `new = previous + quantity`.
    #[serde(rename = "masuk")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "masuk"))]
    In,
    /// Goods removed: `new = previous - quantity`, never below zero.
    #[serde(rename = "keluar")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "keluar"))]
    Out,
    /// Physical count: `new = quantity` (absolute reset).
    #[serde(rename = "opname")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "opname"))]
    CountAdjustment,
}

/// Append-only audit record of a stock change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: i64,
    #[serde(rename = "type")]
    pub movement_type: StockMovementType,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub notes: Option<String>,
    pub user_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Drawer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum CashDrawerType {
    #[serde(rename = "masuk")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "masuk"))]
    In,
    #[serde(rename = "keluar")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "keluar"))]
    Out,
    /// Float placed in the till at the start of a shift.
    #[serde(rename = "saldo_awal")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "saldo_awal"))]
    OpeningBalance,
}

/// Append-only cash drawer ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashDrawerEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub entry_type: CashDrawerType,
    /// Always positive; direction comes from `entry_type`.
    pub amount_cents: i64,
    pub description: String,
    pub user_id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CashDrawerEntry {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// Derived till balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashDrawerBalance {
    pub balance_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
