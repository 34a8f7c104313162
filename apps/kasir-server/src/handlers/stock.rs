use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use kasir_core::input::CreateStockMovementInput;
use kasir_core::StockMovement;

use crate::{ApiResult, AppState};

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateStockMovementInput>, JsonRejection>,
) -> ApiResult<Json<StockMovement>> {
    let Json(input) = payload?;
    let movement = state
        .db
        .stock_movements()
        .create(&input, state.acting_user_id)
        .await?;
    Ok(Json(movement))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<StockMovement>>> {
    Ok(Json(state.db.stock_movements().list().await?))
}
