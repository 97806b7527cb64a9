//! Sales analysis handler

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::{AppError, AppState};
use pulse_core::{AnalysisResponse, AnalysisSource, SalesAnalysisRequest};

/// Response header naming the analyzer that produced the result
pub const SOURCE_HEADER: HeaderName = HeaderName::from_static("x-analysis-source");

/// POST /api/analyze - Find the best promotion day for a sales dataset
pub async fn analyze_sales(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SalesAnalysisRequest>,
) -> Result<Response, AppError> {
    let outcome = state.orchestrator.run_request(request).await?;

    info!(
        source = %outcome.source,
        best_day = %outcome.result.best_date(),
        "Analysis complete"
    );

    let source = match outcome.source {
        AnalysisSource::Ai { .. } => "ai",
        AnalysisSource::Heuristic => "heuristic",
    };
    let body = Json(AnalysisResponse::from(&outcome.result));

    Ok(([(SOURCE_HEADER, HeaderValue::from_static(source))], body).into_response())
}
