//! Pulse Web Server
//!
//! Axum-based REST API for the Pulse sales promotion-day analyzer.
//!
//! - `POST /api/analyze`: best-day analysis (AI first, heuristic fallback)
//! - `GET /api/health`: liveness and active AI provider
//!
//! Security features:
//! - Restrictive CORS policy
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use pulse_core::{AIBackend, AnalysisOrchestrator, PulseConfig, ServerConfig};

mod handlers;

pub use handlers::SOURCE_HEADER;

/// Shared application state
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// Create the application router
pub fn create_router(orchestrator: Arc<AnalysisOrchestrator>, config: ServerConfig) -> Router {
    let cors = build_cors(&config);
    let state = Arc::new(AppState { orchestrator });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze_sales));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors.allow_origin(origins)
    }
}

/// Start the server with resolved configuration
pub async fn serve_with_config(config: PulseConfig) -> anyhow::Result<()> {
    let orchestrator = Arc::new(AnalysisOrchestrator::from_config(&config.ai)?);

    check_ai_connection(&orchestrator).await;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(orchestrator, config.server);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI provider status
async fn check_ai_connection(orchestrator: &AnalysisOrchestrator) {
    match orchestrator.ai() {
        Some(ai) => {
            let client = ai.client();
            if client.health_check().await {
                info!(
                    "✅ AI provider connected: {} ({}, model: {})",
                    client.provider(),
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI provider configured but not responding: {} ({}); requests will fall back to heuristic",
                    client.provider(),
                    client.host()
                );
            }
        }
        None => {
            info!("ℹ️  AI provider not configured (set PULSE_AI_API_KEY to enable AI analysis)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Rejected input: report the broken rule
        if let Some(pulse_core::Error::Validation(rule)) = err.downcast_ref::<pulse_core::Error>() {
            return Self::bad_request(&rule.to_string());
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
