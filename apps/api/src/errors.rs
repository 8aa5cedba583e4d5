use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Body shapes follow the endpoint contract: client errors carry a bare
/// `error` string, server errors carry `success: false` plus `details`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid JSON body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Parse(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Validation(msg) => json!({ "error": msg }),
            AppError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            AppError::NotFound(msg) => json!({ "success": false, "error": msg }),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                internal_body(e.to_string())
            }
            AppError::Parse(e) => {
                tracing::error!("Request body parse error: {e}");
                internal_body(e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                internal_body(e.to_string())
            }
        };

        (status, Json(body)).into_response()
    }
}

fn internal_body(details: String) -> serde_json::Value {
    json!({
        "success": false,
        "error": "Internal server error",
        "details": details
    })
}
