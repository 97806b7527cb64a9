//! Analysis orchestrator
//!
//! AI first, heuristic fallback. Only dataset validation failures reach the
//! caller; anything that goes wrong on the AI path is logged and replaced by
//! the heuristic result.

use tracing::{info, warn};

use crate::analyzer::AiAnalyzer;
use crate::config::AiConfig;
use crate::error::Result;
use crate::heuristic::HeuristicAnalyzer;
use crate::models::{AnalysisResult, AnalysisSource, SalesAnalysisRequest, SalesDataset};

/// A result and the analyzer that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
}

pub struct AnalysisOrchestrator {
    ai: Option<AiAnalyzer>,
    heuristic: HeuristicAnalyzer,
    /// Logged on each run when `ai` is None
    ai_inactive_reason: &'static str,
}

impl AnalysisOrchestrator {
    pub fn new(ai: Option<AiAnalyzer>) -> Self {
        Self {
            ai,
            heuristic: HeuristicAnalyzer::new(),
            ai_inactive_reason: "no AI analyzer configured",
        }
    }

    /// Orchestrator that never calls out
    pub fn heuristic_only() -> Self {
        Self::new(None)
    }

    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let mut orchestrator = Self::new(AiAnalyzer::from_config(config)?);
        if let Some(reason) = config.inactive_reason() {
            orchestrator.ai_inactive_reason = reason;
        }
        Ok(orchestrator)
    }

    pub fn ai(&self) -> Option<&AiAnalyzer> {
        self.ai.as_ref()
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Analyze a validated dataset
    pub async fn run(&self, dataset: &SalesDataset) -> Result<AnalysisOutcome> {
        if let Some(ai) = &self.ai {
            let source = ai.source();
            match ai.try_analyze(dataset).await {
                Ok(result) => {
                    info!(source = %source, "AI analysis succeeded");
                    return Ok(AnalysisOutcome { result, source });
                }
                Err(failure) => {
                    warn!(source = %source, error = %failure, "AI analysis failed, using heuristic");
                }
            }
        } else {
            info!(reason = self.ai_inactive_reason, "Using heuristic analysis");
        }

        let result = self.heuristic.analyze(dataset)?;
        Ok(AnalysisOutcome {
            result,
            source: AnalysisSource::Heuristic,
        })
    }

    /// Validate an inbound request, then analyze it
    pub async fn run_request(&self, request: SalesAnalysisRequest) -> Result<AnalysisOutcome> {
        let dataset = request.into_dataset()?;
        info!(
            metrics = dataset.len(),
            period_start = %dataset.period_start(),
            period_end = %dataset.period_end(),
            "Analyzing sales dataset"
        );
        self.run(&dataset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIClient, MockBackend, PromptTemplate};
    use crate::config::{AiProvider, PulseConfig};
    use crate::error::{Error, ValidationError};
    use crate::heuristic::FALLBACK_SCORE;
    use crate::test_utils::{sample_dataset, sample_request, valid_reply};
    use std::time::Duration;

    fn with_mock(mock: MockBackend) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(Some(AiAnalyzer::new(
            AIClient::Mock(mock),
            PromptTemplate::default(),
            Duration::from_secs(5),
        )))
    }

    #[tokio::test]
    async fn test_ai_success_returned_as_is() {
        let outcome = with_mock(MockBackend::with_reply(&valid_reply()))
            .run(&sample_dataset())
            .await
            .unwrap();
        assert!(outcome.source.is_ai());
        assert_eq!(outcome.result.score(), 0.85);
    }

    #[tokio::test]
    async fn test_ai_error_falls_back() {
        let outcome = with_mock(MockBackend::failing("503"))
            .run(&sample_dataset())
            .await
            .unwrap();
        assert_eq!(outcome.source, AnalysisSource::Heuristic);
        assert_eq!(outcome.result.score(), FALLBACK_SCORE);
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let outcome = with_mock(MockBackend::with_reply("not json at all"))
            .run(&sample_dataset())
            .await
            .unwrap();
        assert_eq!(outcome.source, AnalysisSource::Heuristic);
    }

    #[tokio::test]
    async fn test_missing_field_falls_back() {
        let reply = valid_reply().replace("\"volatility\"", "\"volatile\"");
        let outcome = with_mock(MockBackend::with_reply(&reply))
            .run(&sample_dataset())
            .await
            .unwrap();
        assert_eq!(outcome.source, AnalysisSource::Heuristic);
    }

    #[tokio::test]
    async fn test_heuristic_only() {
        let orchestrator = AnalysisOrchestrator::heuristic_only();
        let outcome = orchestrator.run(&sample_dataset()).await.unwrap();
        assert_eq!(outcome.source, AnalysisSource::Heuristic);
        assert!(!orchestrator.ai_enabled());
    }

    #[tokio::test]
    async fn test_ai_called_once_per_run() {
        let mock = MockBackend::failing("down");
        let orchestrator = with_mock(mock.clone());
        orchestrator.run(&sample_dataset()).await.unwrap();
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_from_config_without_key_is_heuristic() {
        let orchestrator = AnalysisOrchestrator::from_config(&PulseConfig::default().ai).unwrap();
        assert!(!orchestrator.ai_enabled());
        assert_eq!(orchestrator.ai_inactive_reason, "no AI API key configured");
    }

    #[tokio::test]
    async fn test_from_config_mock_provider() {
        let mut ai = PulseConfig::default().ai;
        ai.provider = AiProvider::Mock;
        let orchestrator = AnalysisOrchestrator::from_config(&ai).unwrap();
        let outcome = orchestrator.run(&sample_dataset()).await.unwrap();
        assert!(outcome.source.is_ai());
    }

    #[tokio::test]
    async fn test_run_request_rejects_invalid_input() {
        let mut request = sample_request();
        request.metrics.truncate(1);
        let err = with_mock(MockBackend::new())
            .run_request(request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::TooFewMetrics(1))
        ));
    }

    #[tokio::test]
    async fn test_run_request_valid() {
        let outcome = AnalysisOrchestrator::heuristic_only()
            .run_request(sample_request())
            .await
            .unwrap();
        assert_eq!(outcome.result.best_weekday(), chrono::Weekday::Tue);
    }
}
