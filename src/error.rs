use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Validation(String),

    #[error("Todo not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    InternalServerError,
}

/// Failures of the credential and token helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Could not validate credentials")]
    Invalid,

    #[error("Token expired")]
    Expired,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => {
                let body = Json(json!({ "message": "Todo not found" }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Auth(e @ (AuthError::Invalid | AuthError::Expired)) => {
                (StatusCode::UNAUTHORIZED, e.to_string())
            }
            AppError::Auth(e) => {
                error!("auth error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Migration(e) => {
                error!("migration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
