// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Errors surfaced by the post API.
/// Each variant maps to one HTTP status; the sanitizer never produces any.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error, detail is logged but not returned
    InternalServerError(String),

    // 400 Bad Request (validation failures, malformed JSON)
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (duplicate post title)
    Conflict(String),
}

impl AppError {
    pub fn post_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Post {} not found", id))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "conflict: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Renders `{"error": "..."}` with the matching status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

/// Lets store code use `?` on sqlx calls.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}
