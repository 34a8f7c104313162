use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use kasir_core::input::UpdateDigitalBalanceInput;
use kasir_core::DigitalBalance;

use crate::{ApiResult, AppState};

/// Sets (not adds to) the balance of a digital product.
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateDigitalBalanceInput>, JsonRejection>,
) -> ApiResult<Json<DigitalBalance>> {
    let Json(input) = payload?;
    Ok(Json(state.db.digital_balances().set_balance(&input).await?))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<DigitalBalance>>> {
    Ok(Json(state.db.digital_balances().list().await?))
}
