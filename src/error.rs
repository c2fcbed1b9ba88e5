use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::users::password::PasswordError;
use crate::users::store::{ConflictField, StoreError};
use crate::users::validate::ValidationError;

/// Errors returned by API operations. Every variant renders as a JSON body
/// of the form `{"detail": "..."}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A unique column is already taken. `None` when the conflicting column
    /// could not be determined.
    #[error("{} already registered", conflict_noun(.0))]
    Conflict(Option<ConflictField>),

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("database unreachable")]
    Unavailable(#[source] StoreError),

    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

fn conflict_noun(field: &Option<ConflictField>) -> &'static str {
    match field {
        Some(ConflictField::Username) => "Username",
        Some(ConflictField::Email) => "Email",
        None => "User",
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { field } => ApiError::Conflict(field),
            e @ StoreError::Unavailable(_) => ApiError::Unavailable(e),
            e @ StoreError::Database(_) => ApiError::Internal(e.into()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Conflict(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Unavailable(e) => {
                tracing::error!(error = %e, "database unreachable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
