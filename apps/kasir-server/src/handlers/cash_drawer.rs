//! Till ledger procedures.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use kasir_core::input::CreateCashDrawerInput;
use kasir_core::{CashDrawerBalance, CashDrawerEntry};

use crate::{ApiResult, AppState};

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateCashDrawerInput>, JsonRejection>,
) -> ApiResult<Json<CashDrawerEntry>> {
    let Json(input) = payload?;
    let entry = state
        .db
        .cash_drawer()
        .create(&input, state.acting_user_id)
        .await?;
    Ok(Json(entry))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<CashDrawerEntry>>> {
    Ok(Json(state.db.cash_drawer().list().await?))
}

pub async fn balance(State(state): State<AppState>) -> ApiResult<Json<CashDrawerBalance>> {
    Ok(Json(state.db.cash_drawer().balance().await?))
}
