//! # RPC Error Responses
//!
//! Every failed procedure answers with the same JSON shape:
//!
//! ```text
//! { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for ..." }
//! ```
//!
//! ## Mapping
//! ```text
//! ┌──────────────────────────────────────┬──────────────────────┬────────┐
//! │ Source                               │ code                 │ status │
//! ├──────────────────────────────────────┼──────────────────────┼────────┤
//! │ DbError::NotFound, ProductNotFound   │ NOT_FOUND            │ 404    │
//! │ ValidationError, bad JSON / query    │ VALIDATION_ERROR     │ 400    │
//! │ ForeignKeyViolation                  │ VALIDATION_ERROR     │ 400    │
//! │ InsufficientStock                    │ INSUFFICIENT_STOCK   │ 422    │
//! │ InsufficientBalance                  │ INSUFFICIENT_BALANCE │ 422    │
//! │ InsufficientPayment                  │ PAYMENT_ERROR        │ 422    │
//! │ UniqueViolation                      │ CONFLICT             │ 409    │
//! │ other persistence failures           │ DATABASE_ERROR       │ 500    │
//! │ DbError::Internal                    │ INTERNAL             │ 500    │
//! └──────────────────────────────────────┴──────────────────────┴────────┘
//! ```
//!
//! 500s are logged with the underlying error and answered with a generic
//! message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kasir_core::{CoreError, ValidationError};
use kasir_db::DbError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    InsufficientStock,
    InsufficientBalance,
    PaymentError,
    Conflict,
    DatabaseError,
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InsufficientStock
            | ErrorCode::InsufficientBalance
            | ErrorCode::PaymentError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body of every RPC procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            CoreError::InsufficientPayment { .. } => ErrorCode::PaymentError,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::new(ErrorCode::Conflict, err.to_string()),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::validation("Referenced record does not exist")
            }
            DbError::Internal(_) => {
                tracing::error!(error = %err, "Internal error");
                ApiError::new(ErrorCode::Internal, "Internal server error")
            }
            other => {
                tracing::error!(error = %other, "Database error");
                ApiError::new(ErrorCode::DatabaseError, "Database error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}
