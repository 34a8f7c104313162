//! # Kasir Server
//!
//! HTTP/JSON transport for the POS backend. One route per procedure, all
//! under `/rpc/`; mutations are `POST` with a JSON body, queries are `GET`
//! with a query string.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /rpc/createTransaction                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TraceLayer ──► CorsLayer ──► handlers::transactions::create           │
//! │                                     │                                   │
//! │                                     ├── Json<CreateTransactionInput>   │
//! │                                     ├── AppState.acting_user_id        │
//! │                                     ▼                                   │
//! │                          db.transactions().create(..)                   │
//! │                                     │                                   │
//! │                    Ok ──► 200 Json<Transaction>                         │
//! │                    Err ─► ApiError { code, message }                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use kasir_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    /// Recorded as `user_id` on every write that tracks a user.
    pub acting_user_id: i64,
}

impl AppState {
    pub fn new(db: Database, acting_user_id: i64) -> Self {
        AppState { db, acting_user_id }
    }
}

/// Builds the full `/rpc` router.
pub fn router(state: AppState) -> Router {
    use handlers::{balances, cash_drawer, health, products, reports, stock, transactions, users};

    let rpc = Router::new()
        .route("/healthcheck", get(health::healthcheck))
        // Users
        .route("/createUser", post(users::create))
        .route("/updateUser", post(users::update))
        .route("/getUsers", get(users::list))
        // Products
        .route("/createProduct", post(products::create))
        .route("/updateProduct", post(products::update))
        .route("/getProducts", get(products::list))
        .route("/searchProducts", get(products::search))
        .route("/getLowStockProducts", get(products::low_stock))
        // Digital balances
        .route("/updateDigitalBalance", post(balances::update))
        .route("/getDigitalBalances", get(balances::list))
        // Transactions
        .route("/createTransaction", post(transactions::create))
        .route("/getTransactions", get(transactions::list))
        .route("/getTransactionDetail", get(transactions::detail))
        // Stock
        .route("/createStockMovement", post(stock::create))
        .route("/getStockMovements", get(stock::list))
        // Cash drawer
        .route("/createCashDrawerEntry", post(cash_drawer::create))
        .route("/getCashDrawerEntries", get(cash_drawer::list))
        .route("/getCashDrawerBalance", get(cash_drawer::balance))
        // Reports
        .route("/getSalesReport", get(reports::sales))
        .route("/getProfitReport", get(reports::profit))
        .route("/getTopProducts", get(reports::top_products));

    Router::new()
        .nest("/rpc", rpc)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
