//! # Report Procedures
//!
//! All three take `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`, both days
//! inclusive. A malformed date or a reversed range is a `VALIDATION_ERROR`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use kasir_core::report::{ProfitReport, ReportPeriod, ReportPeriodInput, SalesReportRow, TopProductRow};

use crate::{ApiResult, AppState};

fn period(query: Result<Query<ReportPeriodInput>, QueryRejection>) -> ApiResult<ReportPeriod> {
    let Query(input) = query?;
    Ok(input.period()?)
}

pub async fn sales(
    State(state): State<AppState>,
    query: Result<Query<ReportPeriodInput>, QueryRejection>,
) -> ApiResult<Json<Vec<SalesReportRow>>> {
    let period = period(query)?;
    Ok(Json(state.db.reports().sales(&period).await?))
}

pub async fn profit(
    State(state): State<AppState>,
    query: Result<Query<ReportPeriodInput>, QueryRejection>,
) -> ApiResult<Json<ProfitReport>> {
    let period = period(query)?;
    Ok(Json(state.db.reports().profit(&period).await?))
}

pub async fn top_products(
    State(state): State<AppState>,
    query: Result<Query<ReportPeriodInput>, QueryRejection>,
) -> ApiResult<Json<Vec<TopProductRow>>> {
    let period = period(query)?;
    Ok(Json(state.db.reports().top_products(&period).await?))
}
