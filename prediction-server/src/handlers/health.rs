//! Health check handlers

use axum::{extract::State, Json};
use prediction_core::HealthStatus;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: HealthStatus,
}

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
    version: &'static str,
    timestamp: i64,
}

/// OK when the model is loaded, ERROR when serving degraded
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: state.service.health(),
    })
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Insurance Prediction API",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
