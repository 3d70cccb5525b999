//! Unified error types for the pet registry service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::model::FieldErrors;

/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input fields.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Requested record does not exist.
    #[error("not found")]
    NotFound,

    /// Requested page is out of range or not a positive integer.
    #[error("invalid page")]
    InvalidPage,

    /// Delete blocked by a foreign-key protection (e.g. a group still
    /// referenced by pets).
    #[error("protected: {0}")]
    Protected(String),

    /// Storage-level error.
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Not found." })),
            )
                .into_response(),
            ApiError::InvalidPage => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Invalid page." })),
            )
                .into_response(),
            ApiError::Protected(reason) => (
                StatusCode::CONFLICT,
                Json(json!({ "detail": reason })),
            )
                .into_response(),
            ApiError::Database(err) => {
                // Log the real error, return a generic body.
                error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error." })),
                )
                    .into_response()
            }
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_page_maps_to_404() {
        let response = ApiError::InvalidPage.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let mut errors = FieldErrors::default();
        errors.push("name", "This field is required.");
        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn protected_maps_to_409() {
        let response = ApiError::Protected("group is still referenced".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
