//! Pulse Core Library
//!
//! Shared functionality for the Pulse sales promotion analyzer:
//! - Validated sales models (metrics, datasets, analysis results)
//! - Day-of-week heuristic analyzer
//! - Pluggable AI providers (OpenRouter, Gemini) behind one backend trait
//! - Orchestrator: AI first, heuristic fallback
//! - Layered configuration (embedded defaults, override file, environment)

pub mod ai;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod models;
pub mod orchestrator;

/// Test utilities including a mock AI provider server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, GeminiBackend, MockBackend, OpenAICompatibleBackend, PromptTemplate,
};
pub use analyzer::AiAnalyzer;
pub use config::{AiConfig, AiProvider, PulseConfig, ServerConfig};
pub use error::{AiFailure, Error, Result, ValidationError};
pub use heuristic::{HeuristicAnalyzer, WeekdayAverage};
pub use models::{
    parse_weekday, weekday_name, AnalysisResponse, AnalysisResult, AnalysisSource, Metric,
    RawMetric, SalesAnalysisRequest, SalesDataset,
};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
