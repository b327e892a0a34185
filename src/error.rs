//! Error types for the check-in service.
//!
//! Two layers: [`CheckinError`] is the domain taxonomy used by stores and
//! services, and [`AppError`] bridges domain errors to HTTP responses by
//! implementing Axum's `IntoResponse`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, CheckinError>;

/// Error taxonomy for reservation, intake, session, and invoice operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckinError {
    /// Bad or missing input.
    #[error("{0}")]
    Validation(String),

    /// Unknown reservation or related record.
    #[error("{resource} not found")]
    NotFound {
        /// Human-readable resource name
        resource: String,
    },

    /// Invalid credentials provided.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Session has expired.
    #[error("Session has expired")]
    SessionExpired,

    /// Session not found.
    #[error("Session not found")]
    SessionNotFound,

    /// Guest editing refused, less than one hour before checkout.
    #[error("Editing is no longer allowed (less than 1 hour before checkout)")]
    EditWindowClosed,

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Email delivery failed.
    #[error("Failed to send email")]
    EmailDelivery,
}

impl CheckinError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a missing record.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Returns `true` if this error is due to invalid user input.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidCredentials | Self::EditWindowClosed
        )
    }
}

/// Application error type for web handlers.
///
/// Wraps domain errors and provides HTTP-friendly error responses.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach a source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<CheckinError> for AppError {
    fn from(err: CheckinError) -> Self {
        match &err {
            CheckinError::Validation(message) => Self::validation(message.clone()),
            CheckinError::NotFound { resource } => Self::not_found(resource),
            CheckinError::InvalidCredentials => Self::unauthorized(err.to_string()),
            CheckinError::SessionExpired | CheckinError::SessionNotFound => {
                Self::unauthorized("Not logged in or session expired")
            }
            CheckinError::EditWindowClosed => Self::forbidden(err.to_string()),
            CheckinError::Database(_) | CheckinError::EmailDelivery => {
                Self::internal("An internal error occurred").with_source(err.into())
            }
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err: AppError = CheckinError::not_found("Reservation").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "[NOT_FOUND] Reservation not found");
    }

    #[test]
    fn validation_maps_to_422() {
        let err: AppError = CheckinError::validation("Email is required").into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn bad_credentials_map_to_401() {
        let err: AppError = CheckinError::InvalidCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn edit_window_maps_to_403() {
        let err: AppError = CheckinError::EditWindowClosed.into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn user_error_classification() {
        assert!(CheckinError::validation("x").is_user_error());
        assert!(CheckinError::InvalidCredentials.is_user_error());
        assert!(!CheckinError::Database("boom".to_string()).is_user_error());
    }
}
