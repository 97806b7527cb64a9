//! Error types for Pulse

use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI call timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of the AI analysis path
///
/// Carries only a display message. Transport errors, bad replies and
/// timeouts all map to this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AiFailure {
    message: String,
}

impl AiFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for AiFailure {
    fn from(err: Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A broken domain rule
///
/// Covers both input rules (dataset and metric construction) and result
/// rules, so AI replies and heuristic output go through the same checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("timezone is required")]
    MissingTimezone,

    #[error("period start date is required")]
    MissingPeriodStart,

    #[error("period end date is required")]
    MissingPeriodEnd,

    #[error("invalid date for {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("metrics must not be empty")]
    NoMetrics,

    #[error("at least 2 metrics are required for analysis, got {0}")]
    TooFewMetrics(usize),

    #[error("metrics[{index}]: {source}")]
    InvalidMetric {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("date is required")]
    MissingMetricDate,

    #[error("revenue is required")]
    MissingRevenue,

    #[error("transactions is required")]
    MissingTransactions,

    #[error("revenue must be a non-negative number, got {0}")]
    InvalidRevenue(f64),

    #[error("transactions must be non-negative, got {0}")]
    InvalidTransactions(i64),

    #[error("ticket must be a non-negative number, got {0}")]
    InvalidTicket(f64),

    #[error("period start {start} is after period end {end}")]
    PeriodInverted { start: NaiveDate, end: NaiveDate },

    #[error("metric dated {date} is outside the period {start}..={end}")]
    MetricOutOfPeriod {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("score must be between 0.0 and 1.0, got {0}")]
    ScoreOutOfRange(f64),

    #[error("volatility must be between 0.0 and 1.0, got {0}")]
    VolatilityOutOfRange(f64),

    #[error("reason must not be empty")]
    EmptyReason,

    #[error("insights must have between 2 and 5 items, got {0}")]
    InsightCount(usize),

    #[error("insight #{0} must not be empty")]
    EmptyInsight(usize),
}
