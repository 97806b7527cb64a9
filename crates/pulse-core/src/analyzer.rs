//! AI-backed sales analyzer
//!
//! Renders the analysis prompt, sends it through an `AIClient` under a
//! timeout, and validates the reply. Every failure comes back as an
//! `AiFailure`.

use std::time::Duration;

use tracing::debug;

use crate::ai::{parse_analysis, AIBackend, AIClient, PromptTemplate};
use crate::config::AiConfig;
use crate::error::{AiFailure, Error, Result};
use crate::models::{AnalysisResult, AnalysisSource, SalesDataset};

#[derive(Clone)]
pub struct AiAnalyzer {
    client: AIClient,
    prompt: PromptTemplate,
    timeout: Duration,
}

impl AiAnalyzer {
    pub fn new(client: AIClient, prompt: PromptTemplate, timeout: Duration) -> Self {
        Self {
            client,
            prompt,
            timeout,
        }
    }

    /// Build from configuration; `Ok(None)` when AI is inactive
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        let Some(client) = config.build_client() else {
            return Ok(None);
        };
        let prompt = PromptTemplate::load(config.prompt_path.as_deref())?;
        Ok(Some(Self::new(client, prompt, config.timeout)))
    }

    pub fn client(&self) -> &AIClient {
        &self.client
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Source tag for results produced here
    pub fn source(&self) -> AnalysisSource {
        AnalysisSource::Ai {
            provider: self.client.provider().to_string(),
            model: self.client.model().to_string(),
        }
    }

    /// Run one AI analysis attempt
    pub async fn try_analyze(
        &self,
        dataset: &SalesDataset,
    ) -> std::result::Result<AnalysisResult, AiFailure> {
        let prompt = self.prompt.render(dataset)?;
        debug!(
            provider = self.client.provider(),
            model = %self.client.model(),
            prompt_len = prompt.len(),
            "Sending analysis prompt"
        );

        let reply = tokio::time::timeout(self.timeout, self.client.complete(&prompt))
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;
        debug!(reply = %reply, "Raw AI reply");

        Ok(parse_analysis(&reply)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::config::{AiProvider, PulseConfig};
    use crate::test_utils::{sample_dataset, valid_reply};

    fn analyzer(mock: MockBackend) -> AiAnalyzer {
        AiAnalyzer::new(
            AIClient::Mock(mock),
            PromptTemplate::default(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_valid_reply() {
        let result = analyzer(MockBackend::with_reply(&valid_reply()))
            .try_analyze(&sample_dataset())
            .await
            .unwrap();
        assert_eq!(result.score(), 0.85);
        assert_eq!(result.reason(), "Tuesdays and Wednesdays lead revenue");
    }

    #[tokio::test]
    async fn test_echo_mock_reads_prompt_data() {
        let result = analyzer(MockBackend::new())
            .try_analyze(&sample_dataset())
            .await
            .unwrap();
        assert!(sample_dataset().contains_date(result.best_date()));
    }

    #[tokio::test]
    async fn test_backend_error_becomes_failure() {
        let err = analyzer(MockBackend::failing("connection refused"))
            .try_analyze(&sample_dataset())
            .await
            .unwrap_err();
        assert!(err.message().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_invalid_reply_becomes_failure() {
        let reply = valid_reply().replace("0.85", "7.0");
        let err = analyzer(MockBackend::with_reply(&reply))
            .try_analyze(&sample_dataset())
            .await
            .unwrap_err();
        assert!(err.message().contains("score"));
    }

    #[test]
    fn test_from_config() {
        let config = PulseConfig::default();
        assert!(AiAnalyzer::from_config(&config.ai).unwrap().is_none());

        let mut ai = config.ai.clone();
        ai.provider = AiProvider::Mock;
        ai.timeout = Duration::from_secs(3);
        let analyzer = AiAnalyzer::from_config(&ai).unwrap().unwrap();
        assert_eq!(analyzer.timeout(), Duration::from_secs(3));
        assert_eq!(
            analyzer.source(),
            AnalysisSource::Ai {
                provider: "mock".into(),
                model: "mock".into()
            }
        );
    }

    #[test]
    fn test_from_config_bad_prompt_path() {
        let mut ai = PulseConfig::default().ai;
        ai.provider = AiProvider::Mock;
        ai.prompt_path = Some("/nonexistent/prompt.md".into());
        assert!(matches!(
            AiAnalyzer::from_config(&ai),
            Err(Error::Config(_))
        ));
    }
}
