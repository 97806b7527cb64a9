//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use pulse_core::AIBackend;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_enabled: bool,
    pub provider: Option<&'static str>,
    pub model: Option<String>,
}

/// GET /api/health - Liveness plus the active analysis configuration
///
/// Does not call the AI provider.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let client = state.orchestrator.ai().map(|ai| ai.client());

    Json(HealthResponse {
        status: "ok",
        ai_enabled: client.is_some(),
        provider: client.map(|c| c.provider()),
        model: client.map(|c| c.model().to_string()),
    })
}
