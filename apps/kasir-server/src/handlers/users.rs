use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use kasir_core::input::{CreateUserInput, UpdateUserInput};
use kasir_core::User;

use crate::{ApiResult, AppState};

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserInput>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(input) = payload?;
    Ok(Json(state.db.users().create(&input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserInput>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(input) = payload?;
    Ok(Json(state.db.users().update(&input).await?))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db.users().list().await?))
}
