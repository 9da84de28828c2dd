//! API handlers module

pub mod auth;
pub mod consultations;
pub mod health;

use consultdesk_common::errors::AppError;

/// Router-level fallback for known paths hit with the wrong method
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
