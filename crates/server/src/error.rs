//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Client errors become a 4xx
//! JSON body `{"message": ...}`; server errors are logged, captured to
//! Sentry and answered with a generic message.

use axum::{
    Json,
    extract::{
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use orderdesk_core::FieldErrors;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("{0}")]
    Database(#[from] RepositoryError),

    /// Request body fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Request could not be parsed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A path ID is numeric but outside the ID range, so no row can have it.
    #[error("{entity} not found")]
    UnknownId { entity: &'static str },
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound { .. }
                | RepositoryError::AssociationNotFound { .. }
                | RepositoryError::NoOrders { .. } => StatusCode::NOT_FOUND,
                RepositoryError::DuplicateEmail
                | RepositoryError::InvalidReference { .. }
                | RepositoryError::DuplicateAssociation { .. } => StatusCode::BAD_REQUEST,
                RepositoryError::HasOrders { .. } => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnknownId { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        if let PathRejection::FailedToDeserializePathParams(err) = &rejection
            && let ErrorKind::ParseErrorAtKey { key, value, .. } = err.kind()
            && let Some(entity) = id_entity(key)
            && is_integer(value)
        {
            return Self::UnknownId { entity };
        }
        Self::BadRequest(rejection.body_text())
    }
}

/// Entity named by a path parameter.
fn id_entity(key: &str) -> Option<&'static str> {
    match key {
        "user_id" => Some("User"),
        "product_id" => Some("Product"),
        "order_id" => Some("Order"),
        _ => None,
    }
}

/// Whether `value` is an integer literal, whatever its magnitude.
fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            _ if status.is_server_error() => json!({ "message": "Internal server error" }),
            Self::Validation(errors) => json!({
                "message": "Validation failed",
                "errors": errors,
            }),
            Self::BadRequest(detail) => json!({ "message": detail }),
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
