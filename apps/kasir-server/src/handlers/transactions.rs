//! Checkout and sales history.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use kasir_core::input::CreateTransactionInput;
use kasir_core::{Transaction, TransactionDetail};
use serde::Deserialize;

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub id: i64,
}

/// Runs the whole sale as one unit of work, recorded under the configured
/// acting user.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransactionInput>, JsonRejection>,
) -> ApiResult<Json<Transaction>> {
    let Json(input) = payload?;
    let transaction = state
        .db
        .transactions()
        .create(&input, state.acting_user_id)
        .await?;
    Ok(Json(transaction))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.db.transactions().list().await?))
}

/// `GET /rpc/getTransactionDetail?id=42`
pub async fn detail(
    State(state): State<AppState>,
    query: Result<Query<DetailQuery>, QueryRejection>,
) -> ApiResult<Json<TransactionDetail>> {
    let Query(DetailQuery { id }) = query?;
    Ok(Json(state.db.transactions().get_detail(id).await?))
}
