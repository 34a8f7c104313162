//! # Stock Movement Math
//!
//! ```text
//!   type      previous   quantity   new
//!   ───────   ────────   ────────   ─────────────────────
//!   masuk        50         10       60   (previous + qty)
//!   keluar       50         10       40   (previous − qty, ≥ 0)
//!   opname       50          0        0   (absolute count)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, StockMovementType};

/// Before/after snapshot written to the movement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub previous_stock: i64,
    pub new_stock: i64,
}

impl StockMovementType {
    /// Resulting stock, or `None` if it would drop below zero or overflow.
    pub fn apply(self, previous: i64, quantity: i64) -> Option<i64> {
        let new = match self {
            StockMovementType::In => previous.checked_add(quantity)?,
            StockMovementType::Out => previous.checked_sub(quantity)?,
            StockMovementType::CountAdjustment => quantity,
        };
        (new >= 0).then_some(new)
    }
}

/// Plans a movement against the product's current stock.
///
/// A `masuk` that would overflow the counter is a validation error. Any
/// other unrepresentable result means the stock would go negative.
pub fn plan_movement(
    product: &Product,
    movement_type: StockMovementType,
    quantity: i64,
) -> CoreResult<StockChange> {
    let previous_stock = product.stock_quantity;

    if movement_type == StockMovementType::In && previous_stock.checked_add(quantity).is_none() {
        return Err(ValidationError::too_large(
            "quantity",
            "stock would exceed the supported maximum",
        )
        .into());
    }

    match movement_type.apply(previous_stock, quantity) {
        Some(new_stock) => Ok(StockChange {
            previous_stock,
            new_stock,
        }),
        None => Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: previous_stock,
            required: quantity,
        }),
    }
}
