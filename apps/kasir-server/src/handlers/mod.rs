//! Procedure handlers, one module per area.
//!
//! Handlers stay thin: extract, call the repository, wrap in `Json`.
//! Validation and business rules live in kasir-core and kasir-db.

pub mod balances;
pub mod cash_drawer;
pub mod health;
pub mod products;
pub mod reports;
pub mod stock;
pub mod transactions;
pub mod users;
