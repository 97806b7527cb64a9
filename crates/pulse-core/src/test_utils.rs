//! Test utilities for pulse-core
//!
//! This module provides testing infrastructure including a mock AI provider
//! server that speaks both the OpenAI chat completions and the Gemini
//! generateContent protocols, plus sample datasets.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::models::{Metric, RawMetric, SalesAnalysisRequest, SalesDataset};

/// What the mock server answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this text as the model output
    Text(String),
    /// This HTTP status with an error body
    Status(u16),
    /// Sleep, then answer with the text
    Delay(Duration, String),
}

impl MockReply {
    /// A reply that passes validation
    pub fn valid() -> Self {
        Self::Text(valid_reply())
    }

    /// A valid reply wrapped in prose and a code fence
    pub fn prose_wrapped() -> Self {
        Self::Text(format!(
            "Here is my analysis:\n```json\n{}\n```\nLet me know if you need more.",
            valid_reply()
        ))
    }

    /// Output that is not JSON at all
    pub fn malformed() -> Self {
        Self::Text("I think Tuesday is a good day.".to_string())
    }
}

#[derive(Default)]
struct Recorded {
    prompt: Option<String>,
    auth: Option<String>,
    path: Option<String>,
    requests: usize,
}

struct MockState {
    reply: MockReply,
    recorded: Mutex<Recorded>,
}

/// Mock AI provider server for testing and development
pub struct MockChatServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start the mock server on an available port
    pub async fn start(reply: MockReply) -> Self {
        let state = Arc::new(MockState {
            reply,
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/chat/completions", post(handle_chat))
            .route("/models", get(handle_health))
            .route(
                "/v1beta/models/:action",
                post(handle_generate).get(handle_health),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL (the Gemini host form)
    pub fn gemini_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full chat completions endpoint (the OpenRouter form)
    pub fn openai_url(&self) -> String {
        format!("http://{}/chat/completions", self.addr)
    }

    /// Prompt text of the last completion request
    pub fn last_prompt(&self) -> Option<String> {
        self.state.recorded.lock().unwrap().prompt.clone()
    }

    /// Authorization or x-goog-api-key header of the last completion request
    pub fn last_auth(&self) -> Option<String> {
        self.state.recorded.lock().unwrap().auth.clone()
    }

    /// Path segment after `/v1beta/models/` of the last Gemini request
    pub fn last_path(&self) -> Option<String> {
        self.state.recorded.lock().unwrap().path.clone()
    }

    /// Number of completion requests served
    pub fn request_count(&self) -> usize {
        self.state.recorded.lock().unwrap().requests
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Resolve the configured reply into either model text or an error response
async fn reply_text(state: &MockState) -> Result<String, Response> {
    match &state.reply {
        MockReply::Text(text) => Ok(text.clone()),
        MockReply::Delay(delay, text) => {
            tokio::time::sleep(*delay).await;
            Ok(text.clone())
        }
        MockReply::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((status, Json(json!({"error": {"message": "mock failure"}}))).into_response())
        }
    }
}

/// OpenAI chat completions endpoint
async fn handle_chat(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.requests += 1;
        recorded.prompt = request["messages"][0]["content"].as_str().map(String::from);
        recorded.auth = header(&headers, "authorization");
    }

    match reply_text(&state).await {
        Ok(text) => Json(json!({
            "id": "mock-1",
            "model": request["model"],
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}],
        }))
        .into_response(),
        Err(response) => response,
    }
}

/// Gemini generateContent endpoint
async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.requests += 1;
        recorded.prompt = request["contents"][0]["parts"][0]["text"]
            .as_str()
            .map(String::from);
        recorded.auth = header(&headers, "x-goog-api-key");
        recorded.path = Some(action);
    }

    match reply_text(&state).await {
        Ok(text) => Json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
        }))
        .into_response(),
        Err(response) => response,
    }
}

/// Model listing / model metadata (health check)
async fn handle_health(State(state): State<Arc<MockState>>) -> Response {
    match &state.reply {
        MockReply::Status(code) => {
            StatusCode::from_u16(*code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
        _ => Json(json!({"data": [{"id": "mock-model"}]})).into_response(),
    }
}

// ============================================================================
// Sample data
// ============================================================================

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Monday 100, Tuesday 300, Wednesday 300 in the first week of 2024
pub fn sample_dataset() -> SalesDataset {
    SalesDataset::new(
        "America/Sao_Paulo",
        date("2024-01-01"),
        date("2024-01-07"),
        vec![
            Metric::new(date("2024-01-01"), 100.0, 5, 20.0).unwrap(),
            Metric::new(date("2024-01-02"), 300.0, 10, 30.0).unwrap(),
            Metric::new(date("2024-01-03"), 300.0, 12, 25.0).unwrap(),
        ],
    )
    .unwrap()
}

/// Same data as `sample_dataset`, as an inbound request without tickets
pub fn sample_request() -> SalesAnalysisRequest {
    let metric = |d: &str, revenue: f64, transactions: i64| RawMetric {
        date: Some(d.to_string()),
        revenue: Some(revenue),
        transactions: Some(transactions),
        ticket: None,
    };
    SalesAnalysisRequest {
        timezone: Some("America/Sao_Paulo".to_string()),
        period_start: Some("2024-01-01".to_string()),
        period_end: Some("2024-01-07".to_string()),
        metrics: vec![
            metric("2024-01-01", 100.0, 5),
            metric("2024-01-02", 300.0, 10),
            metric("2024-01-03", 300.0, 12),
        ],
    }
}

/// `sample_request` as a JSON body
pub fn sample_request_json() -> Value {
    serde_json::to_value(sample_request()).unwrap()
}

/// A model reply for the sample data that passes validation
pub fn valid_reply() -> String {
    json!({
        "best_day_date": "2024-01-02",
        "best_day_weekday": "Tuesday",
        "score": 0.85,
        "reason": "Tuesdays and Wednesdays lead revenue",
        "volatility": 0.2,
        "insights": [
            "Tuesday and Wednesday tie on revenue",
            "Monday is the weakest day",
        ],
    })
    .to_string()
}
