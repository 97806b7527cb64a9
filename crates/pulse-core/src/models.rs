//! Domain models for Pulse
//!
//! Every type here validates at construction and is immutable afterwards:
//! - `Metric`: one day's sales observation
//! - `SalesDataset`: a bounded, ordered set of metrics for one period
//! - `AnalysisResult`: the one validated output shape shared by all analyzers
//!
//! The wire types (`SalesAnalysisRequest`, `AnalysisResponse`) map the JSON
//! contract onto these models.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum number of metrics needed for an analysis
pub const MIN_METRICS: usize = 2;

/// Allowed number of insights in a result
pub const MIN_INSIGHTS: usize = 2;
pub const MAX_INSIGHTS: usize = 5;

// ============================================================================
// Weekdays
// ============================================================================

/// English full name for a weekday (e.g. "Monday")
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse an English weekday name, case-insensitive. Accepts full names and
/// three-letter abbreviations.
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Parse an ISO-8601 calendar date (YYYY-MM-DD)
pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}

// ============================================================================
// Metric
// ============================================================================

/// One day's sales observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    date: NaiveDate,
    revenue: f64,
    transactions: u64,
    /// Average order value
    ticket: f64,
}

impl Metric {
    /// Create a metric, rejecting negative or non-finite values
    pub fn new(
        date: NaiveDate,
        revenue: f64,
        transactions: i64,
        ticket: f64,
    ) -> Result<Self, ValidationError> {
        if !revenue.is_finite() || revenue < 0.0 {
            return Err(ValidationError::InvalidRevenue(revenue));
        }
        if transactions < 0 {
            return Err(ValidationError::InvalidTransactions(transactions));
        }
        if !ticket.is_finite() || ticket < 0.0 {
            return Err(ValidationError::InvalidTicket(ticket));
        }

        Ok(Self {
            date,
            revenue,
            transactions: transactions as u64,
            ticket,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    pub fn transactions(&self) -> u64 {
        self.transactions
    }

    pub fn ticket(&self) -> f64 {
        self.ticket
    }

    pub fn weekday(&self) -> Weekday {
        use chrono::Datelike;
        self.date.weekday()
    }
}

/// Metric as received from outside, before validation
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawMetric {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub transactions: Option<i64>,
    #[serde(default)]
    pub ticket: Option<f64>,
}

impl RawMetric {
    /// Ticket to store: derived as revenue / transactions when missing or zero
    pub fn resolved_ticket(&self) -> f64 {
        match (self.ticket, self.revenue, self.transactions) {
            (Some(t), _, _) if t != 0.0 => t,
            (_, Some(revenue), Some(transactions)) if transactions > 0 => {
                revenue / transactions as f64
            }
            _ => 0.0,
        }
    }

    fn into_metric(self) -> Result<Metric, ValidationError> {
        let date = match self.date.as_deref() {
            Some(d) if !d.trim().is_empty() => parse_date("date", d)?,
            _ => return Err(ValidationError::MissingMetricDate),
        };
        let revenue = self.revenue.ok_or(ValidationError::MissingRevenue)?;
        let transactions = self.transactions.ok_or(ValidationError::MissingTransactions)?;
        let ticket = self.resolved_ticket();
        Metric::new(date, revenue, transactions, ticket)
    }
}

// ============================================================================
// SalesDataset
// ============================================================================

/// A validated, date-bounded, ordered collection of metrics
#[derive(Debug, Clone, PartialEq)]
pub struct SalesDataset {
    timezone: String,
    period_start: NaiveDate,
    period_end: NaiveDate,
    metrics: Vec<Metric>,
}

impl SalesDataset {
    /// Build a dataset from already-constructed metrics
    pub fn new(
        timezone: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        metrics: Vec<Metric>,
    ) -> Result<Self, ValidationError> {
        let timezone = validate_timezone(timezone)?;
        validate_metric_count(metrics.len())?;
        Self::assemble(timezone, period_start, period_end, metrics)
    }

    /// Build a dataset from untyped input
    ///
    /// Rules are checked in a fixed order and the first broken one is
    /// returned: timezone, period start, period end, metric count, each
    /// metric's fields, period order, metric dates within the period.
    pub fn from_raw(
        timezone: Option<&str>,
        period_start: Option<&str>,
        period_end: Option<&str>,
        metrics: Vec<RawMetric>,
    ) -> Result<Self, ValidationError> {
        let timezone = validate_timezone(timezone.unwrap_or_default())?;

        let period_start = match period_start {
            Some(s) if !s.trim().is_empty() => parse_date("period_start", s)?,
            _ => return Err(ValidationError::MissingPeriodStart),
        };
        let period_end = match period_end {
            Some(s) if !s.trim().is_empty() => parse_date("period_end", s)?,
            _ => return Err(ValidationError::MissingPeriodEnd),
        };

        validate_metric_count(metrics.len())?;

        let metrics = metrics
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                raw.into_metric()
                    .map_err(|e| ValidationError::InvalidMetric {
                        index,
                        source: Box::new(e),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::assemble(timezone, period_start, period_end, metrics)
    }

    fn assemble(
        timezone: String,
        period_start: NaiveDate,
        period_end: NaiveDate,
        metrics: Vec<Metric>,
    ) -> Result<Self, ValidationError> {
        if period_start > period_end {
            return Err(ValidationError::PeriodInverted {
                start: period_start,
                end: period_end,
            });
        }

        if let Some(outside) = metrics
            .iter()
            .find(|m| m.date < period_start || m.date > period_end)
        {
            return Err(ValidationError::MetricOutOfPeriod {
                date: outside.date,
                start: period_start,
                end: period_end,
            });
        }

        Ok(Self {
            timezone,
            period_start,
            period_end,
            metrics,
        })
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn period_start(&self) -> NaiveDate {
        self.period_start
    }

    pub fn period_end(&self) -> NaiveDate {
        self.period_end
    }

    /// Metrics in input order
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Always false for a constructed dataset
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Whether a date is one of the observed metric dates
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.metrics.iter().any(|m| m.date == date)
    }
}

fn validate_timezone(timezone: &str) -> Result<String, ValidationError> {
    let trimmed = timezone.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingTimezone);
    }
    Ok(trimmed.to_string())
}

fn validate_metric_count(count: usize) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::NoMetrics);
    }
    if count < MIN_METRICS {
        return Err(ValidationError::TooFewMetrics(count));
    }
    Ok(())
}

// ============================================================================
// AnalysisResult
// ============================================================================

/// The validated outcome of an analysis, whichever analyzer produced it
///
/// `best_weekday` is not cross-checked against `best_date`: the heuristic
/// picks them independently and AI replies are taken as given.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    best_date: NaiveDate,
    best_weekday: Weekday,
    score: f64,
    reason: String,
    volatility: f64,
    insights: Vec<String>,
}

impl AnalysisResult {
    pub fn new(
        best_date: NaiveDate,
        best_weekday: Weekday,
        score: f64,
        reason: &str,
        volatility: f64,
        insights: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(ValidationError::ScoreOutOfRange(score));
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::EmptyReason);
        }

        if !(0.0..=1.0).contains(&volatility) {
            return Err(ValidationError::VolatilityOutOfRange(volatility));
        }

        if !(MIN_INSIGHTS..=MAX_INSIGHTS).contains(&insights.len()) {
            return Err(ValidationError::InsightCount(insights.len()));
        }
        let insights = insights
            .iter()
            .enumerate()
            .map(|(i, insight)| {
                let trimmed = insight.trim();
                if trimmed.is_empty() {
                    Err(ValidationError::EmptyInsight(i))
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            best_date,
            best_weekday,
            score,
            reason: reason.to_string(),
            volatility,
            insights,
        })
    }

    pub fn best_date(&self) -> NaiveDate {
        self.best_date
    }

    pub fn best_weekday(&self) -> Weekday {
        self.best_weekday
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn insights(&self) -> &[String] {
        &self.insights
    }
}

/// Which analyzer produced a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisSource {
    /// External AI provider
    Ai { provider: String, model: String },
    /// Local day-of-week heuristic
    Heuristic,
}

impl AnalysisSource {
    pub fn is_ai(&self) -> bool {
        matches!(self, AnalysisSource::Ai { .. })
    }
}

impl std::fmt::Display for AnalysisSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisSource::Ai { provider, model } => write!(f, "ai ({}, {})", provider, model),
            AnalysisSource::Heuristic => write!(f, "heuristic"),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Inbound analysis request
///
/// Fields default to empty so that missing values surface as validation
/// errors naming the rule, rather than as deserialization failures.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SalesAnalysisRequest {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub period_start: Option<String>,
    #[serde(default)]
    pub period_end: Option<String>,
    #[serde(default)]
    pub metrics: Vec<RawMetric>,
}

impl SalesAnalysisRequest {
    pub fn into_dataset(self) -> Result<SalesDataset, ValidationError> {
        SalesDataset::from_raw(
            self.timezone.as_deref(),
            self.period_start.as_deref(),
            self.period_end.as_deref(),
            self.metrics,
        )
    }
}

/// Outbound analysis response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub best_day_date: String,
    pub best_day_weekday: String,
    pub score: f64,
    pub reason: String,
    pub volatility: f64,
    pub insights: Vec<String>,
}

impl From<&AnalysisResult> for AnalysisResponse {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            best_day_date: result.best_date().format("%Y-%m-%d").to_string(),
            best_day_weekday: weekday_name(result.best_weekday()).to_string(),
            score: result.score(),
            reason: result.reason().to_string(),
            volatility: result.volatility(),
            insights: result.insights().to_vec(),
        }
    }
}
