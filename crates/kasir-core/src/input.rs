//! # Input DTOs
//!
//! Payloads accepted by the RPC procedures. Each one knows how to validate
//! itself; handlers call `validate()` before touching the database.
//!
//! ## Partial Updates
//! ```text
//! JSON body                       Rust field (Option<Option<T>>)
//! ───────────────────────────     ──────────────────────────────
//! { }                  (absent)   None            → leave as is
//! { "sku": null }                 Some(None)      → clear column
//! { "sku": "TB-350" }             Some(Some(..))  → set column
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{CashDrawerType, PaymentMethod, ProductType, StockMovementType, UserRole};
use crate::validation::{
    validate_description, validate_full_name, validate_non_negative_cents,
    validate_non_negative_count, validate_optional_text, validate_password,
    validate_positive_cents, validate_product_name, validate_quantity, validate_username,
    ValidationResult,
};
use crate::ValidationError;

/// Distinguishes an explicit `null` from an absent field.
fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: UserRole,
}

impl CreateUserInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_username(&self.username)?;
        validate_full_name(&self.full_name)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserInput {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateUserInput {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(full_name) = &self.full_name {
            validate_full_name(full_name)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    #[serde(default)]
    pub category: Option<String>,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default)]
    pub min_stock_alert: Option<i64>,
}

impl CreateProductInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_optional_text("sku", self.sku.as_deref(), 50)?;
        validate_optional_text("barcode", self.barcode.as_deref(), 50)?;
        validate_optional_text("category", self.category.as_deref(), 100)?;
        validate_non_negative_cents("cost_price_cents", self.cost_price_cents)?;
        validate_positive_cents("selling_price_cents", self.selling_price_cents)?;
        validate_non_negative_count("stock_quantity", self.stock_quantity)?;
        if let Some(min) = self.min_stock_alert {
            validate_non_negative_count("min_stock_alert", min)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProductInput {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub sku: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub barcode: Option<Option<String>>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selling_price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub min_stock_alert: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateProductInput {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(sku) = &self.sku {
            validate_optional_text("sku", sku.as_deref(), 50)?;
        }
        if let Some(barcode) = &self.barcode {
            validate_optional_text("barcode", barcode.as_deref(), 50)?;
        }
        if let Some(category) = &self.category {
            validate_optional_text("category", category.as_deref(), 100)?;
        }
        if let Some(cost) = self.cost_price_cents {
            validate_non_negative_cents("cost_price_cents", cost)?;
        }
        if let Some(price) = self.selling_price_cents {
            validate_positive_cents("selling_price_cents", price)?;
        }
        if let Some(stock) = self.stock_quantity {
            validate_non_negative_count("stock_quantity", stock)?;
        }
        if let Some(Some(min)) = self.min_stock_alert {
            validate_non_negative_count("min_stock_alert", min)?;
        }
        Ok(())
    }
}

// =============================================================================
// Digital Balances
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDigitalBalanceInput {
    pub product_id: i64,
    pub balance_cents: i64,
}

impl UpdateDigitalBalanceInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_non_negative_cents("balance_cents", self.balance_cents)
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// One cart line as submitted by the till.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineInput {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub is_digital_sale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionInput {
    pub items: Vec<CartLineInput>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_received_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateTransactionInput {
    /// Shape checks only. Payment sufficiency is decided by
    /// [`crate::checkout::price_cart`] once the total is known.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.items.is_empty() {
            return Err(ValidationError::required("items"));
        }
        for line in &self.items {
            validate_quantity(line.quantity)?;
            validate_positive_cents("unit_price_cents", line.unit_price_cents)?;
        }
        if let Some(received) = self.payment_received_cents {
            validate_positive_cents("payment_received_cents", received)?;
        }
        validate_optional_text("notes", self.notes.as_deref(), 500)
    }
}

// =============================================================================
// Stock Movements
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStockMovementInput {
    pub product_id: i64,
    #[serde(rename = "type")]
    pub movement_type: StockMovementType,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateStockMovementInput {
    /// `masuk`/`keluar` move at least one unit; an `opname` count may be zero.
    pub fn validate(&self) -> ValidationResult<()> {
        match self.movement_type {
            StockMovementType::In | StockMovementType::Out => validate_quantity(self.quantity)?,
            StockMovementType::CountAdjustment => {
                validate_non_negative_count("quantity", self.quantity)?
            }
        }
        validate_optional_text("notes", self.notes.as_deref(), 500)
    }
}

// =============================================================================
// Cash Drawer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCashDrawerInput {
    #[serde(rename = "type")]
    pub entry_type: CashDrawerType,
    pub amount_cents: i64,
    pub description: String,
}

impl CreateCashDrawerInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_positive_cents("amount_cents", self.amount_cents)?;
        validate_description(&self.description)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
