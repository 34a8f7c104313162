//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! Everything the point-of-sale backend decides without touching storage:
//! money, domain types, validation, checkout math, stock movements, the
//! cash drawer fold and report aggregation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser client                               │   │
//! │  │    Products ──► Cart ──► Payment ──► Receipt ──► Reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP /rpc/<procedure>                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-server (axum)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │  money   │ │ checkout │ │ stock            │  │   │
//! │  │   │  input   │ │  Money   │ │ Fulfill- │ │ cash_drawer      │  │   │
//! │  │   │validation│ │          │ │  ment    │ │ report           │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │        SQLite, migrations, repositories, units of work          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, StockMovement, ...)
//! - [`input`] - Procedure payloads and their validation
//! - [`money`] - Integer-cent `Money`
//! - [`checkout`] - Cart pricing, change, fulfillment decisions
//! - [`stock`] - Stock movement math
//! - [`cash_drawer`] - Till balance fold
//! - [`report`] - Sales, profit and top-product aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//!
//! ## Example
//!
//! ```rust
//! use kasir_core::report::margin_bps;
//! use kasir_core::Money;
//!
//! let revenue = Money::from_units(95);
//! let profit = Money::from_units(25);
//!
//! // 26.32%
//! assert_eq!(margin_bps(profit, revenue), 2632);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cash_drawer;
pub mod checkout;
pub mod error;
pub mod input;
pub mod money;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// User recorded on writes when no other acting user is configured.
///
/// The initial migration seeds this row so a fresh database accepts writes.
pub const DEFAULT_ACTING_USER_ID: i64 = 1;
