//! OpenAI-compatible backend implementation
//!
//! Talks to any endpoint implementing the OpenAI chat completions API. Used
//! for OpenRouter, whose endpoint is the default.
//!
//! The configured URL is the full completions endpoint, e.g.
//! `https://openrouter.ai/api/v1/chat/completions`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::AIBackend;

/// Default OpenRouter chat completions endpoint
pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default OpenRouter model
pub const OPENROUTER_MODEL: &str = "google/gemini-2.0-flash-thinking-exp:free";

const COMPLETIONS_SUFFIX: &str = "/chat/completions";

/// OpenAI-compatible backend
///
/// POSTs a single user message and asks for a JSON object response format.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new backend without authentication
    pub fn new(url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with a bearer API key
    pub fn with_api_key(url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Models listing endpoint next to the completions endpoint
    fn models_url(&self) -> String {
        let base = self
            .url
            .strip_suffix(COMPLETIONS_SUFFIX)
            .unwrap_or(&self.url);
        format!("{}/models", base)
    }

    async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        };

        let mut req_builder = self.http_client.post(&self.url).json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "OpenRouter API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::InvalidData("No response from OpenRouter API".into()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.chat_completion(prompt).await?;
        debug!("OpenRouter response: {}", response);
        Ok(response)
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self.http_client.get(self.models_url());
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.url
    }

    fn provider(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockChatServer, MockReply};

    #[test]
    fn test_backend_new() {
        let backend = OpenAICompatibleBackend::new(OPENROUTER_URL, OPENROUTER_MODEL);
        assert_eq!(backend.model(), OPENROUTER_MODEL);
        assert_eq!(backend.host(), OPENROUTER_URL);
        assert!(backend.api_key.is_none());
    }

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080/chat/completions/", "m");
        assert_eq!(backend.host(), "http://localhost:8080/chat/completions");
    }

    #[test]
    fn test_backend_with_api_key() {
        let backend = OpenAICompatibleBackend::with_api_key(OPENROUTER_URL, "m", "sk-test123");
        assert_eq!(backend.api_key, Some("sk-test123".to_string()));
    }

    #[test]
    fn test_models_url() {
        let backend = OpenAICompatibleBackend::new(OPENROUTER_URL, "m");
        assert_eq!(backend.models_url(), "https://openrouter.ai/api/v1/models");

        let backend = OpenAICompatibleBackend::new("http://localhost:9000/custom", "m");
        assert_eq!(backend.models_url(), "http://localhost:9000/custom/models");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "m".into(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: "hi".into(),
            }],
            response_format: ResponseFormat {
                kind: "json_object".into(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockChatServer::start(MockReply::Text("{\"ok\": true}".into())).await;
        let backend =
            OpenAICompatibleBackend::with_api_key(&server.openai_url(), "test-model", "sk-test");

        let reply = backend.complete("prompt").await.unwrap();
        assert_eq!(reply, "{\"ok\": true}");
        assert!(backend.health_check().await);

        let seen = server.last_prompt().unwrap();
        assert_eq!(seen, "prompt");
        assert_eq!(server.last_auth().as_deref(), Some("Bearer sk-test"));
    }

    #[tokio::test]
    async fn test_complete_error_status() {
        let server = MockChatServer::start(MockReply::Status(500)).await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.openai_url(), "m", "k");

        let err = backend.complete("prompt").await.unwrap_err();
        assert!(err.to_string().contains("OpenRouter API error 500"));
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1/chat/completions", "m");
        assert!(!backend.health_check().await);
    }
}
