//! # Repository Module
//!
//! One repository per table family, each a cheap clone of the pool.
//!
//! ## Repository Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  RPC handler                                                           │
//! │       │  db.transactions().create(&input, acting_user_id)              │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┬──────────────────────────────────────────┐   │
//! │  │ UserRepository       │ users (argon2 hashes stay inside)        │   │
//! │  │ ProductRepository    │ products (+ zero balance for digital)    │   │
//! │  │ DigitalBalanceRepo.  │ digital_balances                         │   │
//! │  │ TransactionRepo.     │ transactions, transaction_items          │   │
//! │  │ StockMovementRepo.   │ stock_movements                          │   │
//! │  │ CashDrawerRepository │ cash_drawer                              │   │
//! │  │ ReportRepository     │ read-only joins for reports              │   │
//! │  └──────────────────────┴──────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multi-row writes (`transactions().create`, `stock_movements().create`,
//! `products().create`) run inside a single `pool.begin()` unit of work.

pub mod cash_drawer;
pub mod digital_balance;
pub mod product;
pub mod report;
pub mod stock_movement;
pub mod transaction;
pub mod user;
