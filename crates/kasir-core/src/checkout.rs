//! # Checkout
//!
//! The arithmetic and decisions behind `createTransaction`, separated from
//! the unit of work that persists them.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CreateTransactionInput                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_cart()  ── total = Σ qty × unit_price                           │
//! │       │           cash:    received required, received ≥ total,        │
//! │       │                    change = received − total                   │
//! │       │           digital: received = change = None                    │
//! │       ▼                                                                 │
//! │  PricedCart ───────────────────────► kasir-db opens the unit of work   │
//! │                                           │                             │
//! │         for each line, in order:          ▼                             │
//! │         Fulfillment::for_line(product, is_digital_sale)                │
//! │           ├── DeductStock    → ensure_stock()   → stock −= qty         │
//! │           ├── DeductBalance  → ensure_balance() → balance −= total     │
//! │           └── Untracked      → line recorded, nothing decremented      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::input::{CartLineInput, CreateTransactionInput};
use crate::money::Money;
use crate::types::{PaymentMethod, Product, ProductType};

/// Prefix of every transaction number.
pub const TRANSACTION_NUMBER_PREFIX: &str = "TRX";

/// Length of the random tail of a transaction number.
const SUFFIX_LEN: usize = 5;

// =============================================================================
// Priced Cart
// =============================================================================

/// A cart line with its total computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub is_digital_sale: bool,
}

impl TryFrom<&CartLineInput> for PricedLine {
    type Error = ValidationError;

    fn try_from(line: &CartLineInput) -> Result<Self, Self::Error> {
        let unit_price = Money::from_cents(line.unit_price_cents);
        let total_price = unit_price
            .checked_multiply_quantity(line.quantity)
            .ok_or_else(|| ValidationError::too_large("items", "line total is too large"))?;

        Ok(PricedLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price,
            total_price,
            is_digital_sale: line.is_digital_sale,
        })
    }
}

/// Everything about a sale that can be known before reading the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// `Some` only for cash.
    pub payment_received: Option<Money>,
    /// `Some` only for cash.
    pub change: Option<Money>,
}

/// Validates the input, prices every line and settles the payment.
///
/// ## Example
/// ```rust
/// use kasir_core::checkout::price_cart;
/// use kasir_core::input::{CartLineInput, CreateTransactionInput};
/// use kasir_core::PaymentMethod;
///
/// let input = CreateTransactionInput {
///     items: vec![CartLineInput {
///         product_id: 1,
///         quantity: 3,
///         unit_price_cents: 1500,
///         is_digital_sale: false,
///     }],
///     payment_method: PaymentMethod::Cash,
///     payment_received_cents: Some(5000),
///     notes: None,
/// };
///
/// let cart = price_cart(&input).unwrap();
/// assert_eq!(cart.total.cents(), 4500);
/// assert_eq!(cart.change.unwrap().cents(), 500);
/// ```
pub fn price_cart(input: &CreateTransactionInput) -> CoreResult<PricedCart> {
    input.validate()?;

    let lines = input
        .items
        .iter()
        .map(PricedLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let total = lines
        .iter()
        .try_fold(Money::zero(), |acc, l| acc.checked_add(l.total_price))
        .ok_or_else(|| ValidationError::too_large("items", "cart total is too large"))?;

    let (payment_received, change) = match input.payment_method {
        PaymentMethod::Cash => {
            let received = input
                .payment_received_cents
                .map(Money::from_cents)
                .ok_or_else(|| ValidationError::required("payment_received_cents"))?;

            if received < total {
                return Err(CoreError::InsufficientPayment { received, total });
            }

            (Some(received), Some(received.saturating_excess_over(total)))
        }
        PaymentMethod::Digital => (None, None),
    };

    Ok(PricedCart {
        lines,
        total,
        payment_method: input.payment_method,
        payment_received,
        change,
    })
}

// =============================================================================
// Fulfillment
// =============================================================================

/// What selling a line does to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fulfillment {
    /// Physical product sold physically: decrement `stock_quantity`.
    DeductStock,
    /// Digital product sold digitally: decrement the digital balance by the line total.
    DeductBalance,
    /// Any other combination: recorded, nothing decremented.
    Untracked,
}

impl Fulfillment {
    pub fn for_line(product_type: ProductType, is_digital_sale: bool) -> Self {
        match (product_type, is_digital_sale) {
            (ProductType::Physical, false) => Fulfillment::DeductStock,
            (ProductType::Digital, true) => Fulfillment::DeductBalance,
            (ProductType::Physical, true) | (ProductType::Digital, false) => Fulfillment::Untracked,
        }
    }
}

/// Fails with `InsufficientStock` unless `product` has `required` units on hand.
pub fn ensure_stock(product: &Product, required: i64) -> CoreResult<()> {
    if product.stock_quantity < required {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock_quantity,
            required,
        });
    }
    Ok(())
}

/// Fails with `InsufficientBalance` unless `available` covers `required`.
pub fn ensure_balance(product: &Product, available: Money, required: Money) -> CoreResult<()> {
    if available < required {
        return Err(CoreError::InsufficientBalance {
            product: product.name.clone(),
            available,
            required,
        });
    }
    Ok(())
}

// =============================================================================
// Transaction Number
// =============================================================================

/// Builds `TRX-<unix millis>-<5 lowercase alphanumerics>`.
///
/// The random tail comes from a v4 UUID rendered in lowercase hex. The
/// database keeps a UNIQUE index on the column as the final guard.
pub fn generate_transaction_number(now: DateTime<Utc>) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        TRANSACTION_NUMBER_PREFIX,
        now.timestamp_millis(),
        &random[..SUFFIX_LEN]
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i64, quantity: i64, unit_price_cents: i64) -> CartLineInput {
        CartLineInput {
            product_id,
            quantity,
            unit_price_cents,
            is_digital_sale: false,
        }
    }

    fn cash(items: Vec<CartLineInput>, received: Option<i64>) -> CreateTransactionInput {
        CreateTransactionInput {
            items,
            payment_method: PaymentMethod::Cash,
            payment_received_cents: received,
            notes: None,
        }
    }

    #[test]
    fn test_total_is_exact_sum_of_lines() {
        let input = cash(vec![line(1, 3, 1500), line(2, 2, 3500), line(3, 7, 33)], Some(20_000));
        let cart = price_cart(&input).unwrap();

        assert_eq!(cart.total.cents(), 4500 + 7000 + 231);
        assert_eq!(cart.lines[2].total_price.cents(), 231);
        assert_eq!(cart.change.unwrap().cents(), 20_000 - 11_731);
    }

    #[test]
    fn test_exact_cash_gives_zero_change() {
        let cart = price_cart(&cash(vec![line(1, 1, 9500)], Some(9500))).unwrap();
        assert_eq!(cart.payment_received, Some(Money::from_cents(9500)));
        assert_eq!(cart.change, Some(Money::zero()));
    }

    #[test]
    fn test_short_cash_is_rejected() {
        let err = price_cart(&cash(vec![line(1, 1, 9500)], Some(9000))).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientPayment {
                received: Money::from_cents(9000),
                total: Money::from_cents(9500),
            }
        );
    }

    #[test]
    fn test_cash_requires_received_amount() {
        let err = price_cart(&cash(vec![line(1, 1, 100)], None)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_line_total_overflow_is_rejected() {
        let input = cash(vec![line(1, 2, i64::MAX / 2 + 1)], Some(i64::MAX));
        let err = price_cart(&input).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_cart_total_overflow_is_rejected() {
        let half = i64::MAX / 2 + 1;
        let input = cash(vec![line(1, 1, half), line(2, 1, half)], Some(i64::MAX));
        let err = price_cart(&input).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_digital_payment_ignores_received() {
        let input = CreateTransactionInput {
            items: vec![line(1, 2, 1000)],
            payment_method: PaymentMethod::Digital,
            payment_received_cents: Some(999_999),
            notes: Some("QRIS".to_string()),
        };
        let cart = price_cart(&input).unwrap();

        assert_eq!(cart.total.cents(), 2000);
        assert_eq!(cart.payment_received, None);
        assert_eq!(cart.change, None);
    }

    #[test]
    fn test_fulfillment_matrix() {
        assert_eq!(
            Fulfillment::for_line(ProductType::Physical, false),
            Fulfillment::DeductStock
        );
        assert_eq!(
            Fulfillment::for_line(ProductType::Digital, true),
            Fulfillment::DeductBalance
        );
        assert_eq!(
            Fulfillment::for_line(ProductType::Physical, true),
            Fulfillment::Untracked
        );
        assert_eq!(
            Fulfillment::for_line(ProductType::Digital, false),
            Fulfillment::Untracked
        );
    }

    #[test]
    fn test_transaction_number_format() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let number = generate_transaction_number(now);

        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TRX");
        assert_eq!(parts[1], "1700000000123");
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_transaction_numbers_differ() {
        let now = Utc::now();
        assert_ne!(generate_transaction_number(now), generate_transaction_number(now));
    }
}
