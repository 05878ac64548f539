//! Health check endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::backend::backend_name;
use crate::server::state::SharedState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub model_available: bool,
    pub backend: String,
}

/// GET /health - Health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: crate::VERSION.to_string(),
        model_available: state.classifier.is_available(),
        backend: backend_name().to_string(),
    })
}
