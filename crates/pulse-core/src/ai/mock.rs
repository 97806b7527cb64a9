//! Mock backend for testing
//!
//! By default it answers like a well-behaved model: it reads the sales data
//! back out of the prompt and names the highest-revenue day. Canned replies
//! and failures can be configured for specific tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::weekday_name;

use super::AIBackend;

#[derive(Clone, Debug)]
enum Behavior {
    /// Answer from the data embedded in the prompt
    Echo,
    /// Fixed reply text
    Reply(String),
    /// Fail every call with this message
    Fail(String),
}

/// Mock AI backend for testing
#[derive(Clone, Debug)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            behavior: Behavior::Echo,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Always reply with the given text
    pub fn with_reply(reply: &str) -> Self {
        Self {
            behavior: Behavior::Reply(reply.to_string()),
            ..Self::new()
        }
    }

    /// Fail every completion with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            behavior: Behavior::Fail(message.to_string()),
            ..Self::new()
        }
    }

    /// Number of completions requested so far (shared across clones)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Deserialize)]
struct EmbeddedData {
    metrics: Vec<EmbeddedMetric>,
}

#[derive(Deserialize)]
struct EmbeddedMetric {
    date: NaiveDate,
    revenue: f64,
}

/// Build a plausible reply from the dataset JSON inside the prompt
fn echo_reply(prompt: &str) -> Result<String> {
    let start = prompt
        .rfind("{\"timezone\"")
        .ok_or_else(|| Error::InvalidData("No sales data in prompt".into()))?;
    let end = prompt
        .rfind('}')
        .filter(|e| *e > start)
        .ok_or_else(|| Error::InvalidData("No sales data in prompt".into()))?;
    let data: EmbeddedData = serde_json::from_str(&prompt[start..=end])?;

    let best = data
        .metrics
        .iter()
        .fold(None::<&EmbeddedMetric>, |best, m| match best {
            Some(b) if m.revenue <= b.revenue => Some(b),
            _ => Some(m),
        })
        .ok_or_else(|| Error::InvalidData("No metrics in prompt".into()))?;

    let weekday = weekday_name(best.date.weekday());
    Ok(serde_json::json!({
        "best_day_date": best.date.format("%Y-%m-%d").to_string(),
        "best_day_weekday": weekday,
        "score": 0.9,
        "reason": format!("{} had the highest revenue in the period", weekday),
        "volatility": 0.1,
        "insights": [
            format!("{} metrics reviewed", data.metrics.len()),
            format!("Peak revenue on {}", weekday),
        ],
    })
    .to_string())
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Echo => echo_reply(prompt),
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::Fail(message) => Err(Error::InvalidData(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}
