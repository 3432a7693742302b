use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::utils::response::error as error_response;

/// Field name to human readable violation message.
pub type FieldErrors = BTreeMap<String, String>;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationError(FieldErrors),

    #[error("Event with id {0} not found")]
    NotFound(i64),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    /// Single-field validation failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), message.into());
        AppError::ValidationError(errors)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTimezone(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(errors) => {
                warn!(?errors, "Rejected invalid event");
            }
            AppError::NotFound(_) | AppError::InvalidTimezone(_) | AppError::BadRequest(_) => {
                warn!(error = %self, "Client error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::InternalServerError(msg) => {
                error!(message = %msg, "Internal server error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        self.log();

        match self {
            AppError::ValidationError(errors) => {
                let reason = status.canonical_reason().unwrap_or("Bad Request");
                error_response(status, reason, Some(errors))
            }
            // Internal details stay in the log
            AppError::DatabaseError(_) => {
                error_response(status, "A database error occurred", None)
            }
            AppError::InternalServerError(_) => {
                error_response(status, "An unexpected error occurred", None)
            }
            other => error_response(status, other.to_string(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::field("title", "Title is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InvalidTimezone("Mars/Base".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_every_field() {
        let mut errors = FieldErrors::new();
        errors.insert("title".into(), "Title is required".into());
        errors.insert("endDateTime".into(), "End date time is required".into());

        let response = AppError::ValidationError(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["message"], "Bad Request");
        assert_eq!(body["errors"]["title"], "Title is required");
        assert_eq!(body["errors"]["endDateTime"], "End date time is required");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_not_found_body_names_the_id() {
        let response = AppError::NotFound(999).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "Event with id 999 not found");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_database_error_hides_details() {
        let response = AppError::DatabaseError(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "A database error occurred");
    }
}
