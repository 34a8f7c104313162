//! Catalog procedures.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use kasir_core::input::{CreateProductInput, UpdateProductInput};
use kasir_core::Product;
use serde::Deserialize;

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Json(input) = payload?;
    Ok(Json(state.db.products().create(&input).await?))
}

/// Absent fields are left alone; `null` clears the nullable ones.
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateProductInput>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Json(input) = payload?;
    Ok(Json(state.db.products().update(&input).await?))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().list().await?))
}

/// `GET /rpc/searchProducts?q=indomie`
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Product>>> {
    let Query(SearchQuery { q }) = query?;
    Ok(Json(state.db.products().search(&q).await?))
}

pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().low_stock().await?))
}
