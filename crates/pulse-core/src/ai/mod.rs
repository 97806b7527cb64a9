//! Pluggable AI provider abstraction
//!
//! This module provides a provider-agnostic interface for the AI analysis path.
//!
//! # Architecture
//!
//! - `AIBackend` trait: a single prompt-in, text-out completion plus health/identity
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend` (OpenRouter),
//!   `GeminiBackend`, `MockBackend`
//! - `prompt`: the embedded analysis prompt template
//! - `parsing`: reply text to validated `AnalysisResult`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = PulseConfig::load(None)?;
//! if let Some(client) = config.ai.build_client() {
//!     let reply = client.complete(&prompt).await?;
//!     let result = parse_analysis(&reply)?;
//! }
//! ```

mod gemini;
mod mock;
mod openai_compatible;
pub mod parsing;
pub mod prompt;

pub use gemini::{GeminiBackend, GEMINI_HOST, GEMINI_MODEL};
pub use mock::MockBackend;
pub use openai_compatible::{OpenAICompatibleBackend, OPENROUTER_MODEL, OPENROUTER_URL};
pub use parsing::parse_analysis;
pub use prompt::PromptTemplate;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send a prompt and return the raw reply text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable and accepts our credentials
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;

    /// Short provider identifier ("openrouter", "gemini", "mock")
    fn provider(&self) -> &'static str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenRouter (OpenAI chat completions API)
    OpenRouter(OpenAICompatibleBackend),
    /// Google Gemini generateContent API
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an OpenRouter client for a chat completions endpoint
    pub fn openrouter(url: &str, model: &str, api_key: &str) -> Self {
        AIClient::OpenRouter(OpenAICompatibleBackend::with_api_key(url, model, api_key))
    }

    /// Create a Gemini client for an API host
    pub fn gemini(host: &str, model: &str, api_key: &str) -> Self {
        AIClient::Gemini(GeminiBackend::new(host, model, api_key))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::OpenRouter(b) => b.complete(prompt).await,
            AIClient::Gemini(b) => b.complete(prompt).await,
            AIClient::Mock(b) => b.complete(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenRouter(b) => b.health_check().await,
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenRouter(b) => b.model(),
            AIClient::Gemini(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenRouter(b) => b.host(),
            AIClient::Gemini(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }

    fn provider(&self) -> &'static str {
        match self {
            AIClient::OpenRouter(b) => b.provider(),
            AIClient::Gemini(b) => b.provider(),
            AIClient::Mock(b) => b.provider(),
        }
    }
}
