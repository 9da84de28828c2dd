//! Authentication handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::AppState;
use consultdesk_common::{
    auth::{encode_token, now_ms, permissions_for, verify_password},
    errors::{AppError, Result},
    metrics,
};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub username: String,
    pub role: String,
    pub permissions: Vec<&'static str>,
}

/// Authenticate a configured user and issue a session token
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = payload.map_err(|e| AppError::InvalidPayload {
        message: e.body_text(),
    })?;

    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation {
            message: "Username and password are required".to_string(),
        });
    }

    let user = state
        .config
        .auth
        .find_user(&username)
        .filter(|user| verify_password(&password, &user.password_sha256));

    let user = match user {
        Some(user) => user,
        None => {
            metrics::record_login(false);
            return Err(AppError::InvalidCredentials);
        }
    };

    metrics::record_login(true);

    let token = encode_token(&user.username, &user.role, now_ms());

    tracing::info!(username = %user.username, role = %user.role, "User authenticated");

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: UserInfo {
            username: user.username.clone(),
            role: user.role.clone(),
            permissions: permissions_for(&user.role).to_vec(),
        },
    }))
}
