//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub store: StoreCheck,
}

#[derive(Serialize)]
pub struct StoreCheck {
    pub status: String,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Readiness probe - reports the store health descriptor
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let start = std::time::Instant::now();

    let status = state.store.health_check().await;

    let latency_ms = state
        .store
        .is_configured()
        .then(|| start.elapsed().as_millis() as u64);

    Json(ReadyResponse {
        status: status.as_str().to_string(),
        checks: HealthChecks {
            store: StoreCheck {
                status: status.as_str().to_string(),
                configured: state.store.is_configured(),
                latency_ms,
            },
        },
    })
}
