//! Error types for ConsultDesk services
//!
//! Provides:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - The flat `{"error": ...}` response shape the frontend consumes
//!
//! Upstream (remote store / form relay) failures are deliberately absent
//! here: the store gateway recovers them locally with fallback data, so they
//! never reach a handler as an error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    InvalidPayload { message: String },

    // Authentication errors
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Authorization errors
    #[error("Insufficient permissions: {permission} required")]
    InsufficientPermissions { permission: String },

    // Resource errors
    #[error("Consultation not found")]
    ConsultationNotFound,

    // Routing
    #[error("Method not allowed")]
    MethodNotAllowed,

    // Rate limiting
    #[error("Too many requests")]
    RateLimited,

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::InvalidPayload { .. } => {
                StatusCode::BAD_REQUEST
            }

            AppError::AuthenticationRequired
            | AppError::InvalidToken
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,

            AppError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,

            AppError::ConsultationNotFound => StatusCode::NOT_FOUND,

            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            AppError::Internal { .. } | AppError::Configuration { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Error response body
///
/// `message` carries internal detail and is only populated for 500s.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Server error");
        } else if self.is_client_error() {
            tracing::warn!(error = %self, status = status.as_u16(), "Client error");
        }

        let body = match self {
            AppError::Internal { message } | AppError::Configuration { message } => {
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    message: Some(message),
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::AuthenticationRequired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::ConsultationNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );

        let err = AppError::InsufficientPermissions {
            permission: "edit_consultations".into(),
        };
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.to_string(),
            "Insufficient permissions: edit_consultations required"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "something went wrong".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }

    #[test]
    fn test_validation_error_message() {
        let err = AppError::Validation {
            message: "Name, email, and service are required".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Name, email, and service are required");
    }
}
