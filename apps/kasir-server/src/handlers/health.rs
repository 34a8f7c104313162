//! Liveness probe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}

/// `GET /rpc/healthcheck`. 503 when the database does not answer.
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = state.db.health_check().await;

    let (status, body) = if database_up {
        (
            StatusCode::OK,
            HealthResponse {
                status: "ok",
                timestamp: Utc::now().to_rfc3339(),
                database: "up",
            },
        )
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "degraded",
                timestamp: Utc::now().to_rfc3339(),
                database: "down",
            },
        )
    };

    (status, Json(body))
}
