//! JSON parsing helpers for AI backend responses
//!
//! Models often wrap their JSON in prose or code fences, so the payload is
//! taken from the first `{` to the last `}`. Beyond that extraction the
//! parse is strict: every field must be present with the right JSON type,
//! and the result must pass `AnalysisResult` validation.

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{parse_date, parse_weekday, AnalysisResult};

/// Prompt guidance only; longer text is accepted with a warning
pub const MAX_REASON_CHARS: usize = 200;
pub const MAX_INSIGHT_CHARS: usize = 100;

/// Reply shape requested by the analysis prompt
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    best_day_date: String,
    best_day_weekday: String,
    score: f64,
    reason: String,
    volatility: f64,
    insights: Vec<String>,
}

/// Slice out the outermost JSON object, if any
pub fn extract_json(response: &str) -> Option<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Some(&response[s..=e]),
        _ => None,
    }
}

fn truncate_for_error(text: &str) -> String {
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Parse an analysis reply into a validated result
pub fn parse_analysis(response: &str) -> Result<AnalysisResult> {
    let json_str = extract_json(response).ok_or_else(|| {
        Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            truncate_for_error(response.trim())
        ))
    })?;

    let raw: RawAnalysis = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid analysis JSON from AI: {} | Raw: {}",
            e,
            truncate_for_error(json_str)
        ))
    })?;

    let best_date = parse_date("best_day_date", &raw.best_day_date)?;
    let best_weekday = parse_weekday(&raw.best_day_weekday).ok_or_else(|| {
        Error::InvalidData(format!(
            "Unknown weekday from AI: {:?}",
            raw.best_day_weekday
        ))
    })?;

    if raw.reason.chars().count() > MAX_REASON_CHARS {
        warn!(
            len = raw.reason.chars().count(),
            "AI reason exceeds {} characters", MAX_REASON_CHARS
        );
    }
    for (i, insight) in raw.insights.iter().enumerate() {
        if insight.chars().count() > MAX_INSIGHT_CHARS {
            warn!(
                index = i,
                len = insight.chars().count(),
                "AI insight exceeds {} characters",
                MAX_INSIGHT_CHARS
            );
        }
    }

    let result = AnalysisResult::new(
        best_date,
        best_weekday,
        raw.score,
        &raw.reason,
        raw.volatility,
        raw.insights,
    )?;
    Ok(result)
}
