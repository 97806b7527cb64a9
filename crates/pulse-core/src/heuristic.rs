//! Day-of-week heuristic analyzer
//!
//! Deterministic local fallback used whenever the AI path is unavailable or
//! fails. Groups revenue by weekday, picks the weekday with the highest mean,
//! and picks the single best date by raw revenue.

use chrono::{NaiveDate, Weekday};
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{weekday_name, AnalysisResult, SalesDataset, MAX_INSIGHTS};

/// Fixed confidence reported for heuristic results
pub const FALLBACK_SCORE: f64 = 0.55;

const MAX_VOLATILITY: f64 = 1.0;
const VOLATILITY_MULTIPLIER: f64 = 2.0;

/// Distinct weekdays needed before the pattern is called sufficient
const SUFFICIENT_WEEKDAYS: usize = 3;

const REASON: &str = "Heuristic analysis based on average revenue per weekday";

/// Mean revenue for one weekday bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekdayAverage {
    pub weekday: Weekday,
    pub mean: f64,
    pub count: usize,
    /// Earliest metric date in the bucket
    pub first_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a dataset
    ///
    /// Cannot fail for a constructed `SalesDataset`; the `Result` carries the
    /// shared `AnalysisResult` validation.
    pub fn analyze(&self, dataset: &SalesDataset) -> Result<AnalysisResult, ValidationError> {
        let averages = Self::weekday_averages(dataset);
        for avg in &averages {
            debug!(
                weekday = weekday_name(avg.weekday),
                mean = avg.mean,
                count = avg.count,
                "Weekday bucket"
            );
        }

        // Exact mean ties go to the chronologically earliest weekday
        let best = averages
            .iter()
            .fold(None::<&WeekdayAverage>, |best, avg| match best {
                Some(b) if avg.mean < b.mean => Some(b),
                Some(b) if avg.mean == b.mean && avg.first_date >= b.first_date => Some(b),
                _ => Some(avg),
            });
        let best_weekday = best.map(|b| b.weekday).unwrap_or(Weekday::Mon);

        let best_date = best_revenue_date(dataset);
        let volatility = volatility(dataset);

        let distinct = averages.len();
        let mut insights = vec![
            format!("Analysis based on {} distinct weekdays", distinct),
            format!("Best day identified: {}", weekday_name(best_weekday)),
            if distinct >= SUFFICIENT_WEEKDAYS {
                "Sufficient data to identify a weekly pattern".to_string()
            } else {
                "Limited data, the weekly pattern may not be representative".to_string()
            },
            "No AI available, using heuristic algorithm".to_string(),
        ];
        insights.truncate(MAX_INSIGHTS);

        AnalysisResult::new(
            best_date,
            best_weekday,
            FALLBACK_SCORE,
            REASON,
            volatility,
            insights,
        )
    }

    /// Per-weekday revenue means, in order of each weekday's first occurrence
    pub fn weekday_averages(dataset: &SalesDataset) -> Vec<WeekdayAverage> {
        let mut buckets: Vec<WeekdayAverage> = Vec::with_capacity(7);
        for metric in dataset.metrics() {
            let day = metric.weekday();
            match buckets.iter_mut().find(|b| b.weekday == day) {
                // Running mean stays finite for large revenues
                Some(bucket) => {
                    bucket.count += 1;
                    bucket.mean += (metric.revenue() - bucket.mean) / bucket.count as f64;
                    bucket.first_date = bucket.first_date.min(metric.date());
                }
                None => buckets.push(WeekdayAverage {
                    weekday: day,
                    mean: metric.revenue(),
                    count: 1,
                    first_date: metric.date(),
                }),
            }
        }
        buckets
    }
}

/// Date of the highest-revenue metric; earliest date wins ties
fn best_revenue_date(dataset: &SalesDataset) -> NaiveDate {
    let metrics = dataset.metrics();
    let mut best = &metrics[0];
    for metric in &metrics[1..] {
        if metric.revenue() > best.revenue()
            || (metric.revenue() == best.revenue() && metric.date() < best.date())
        {
            best = metric;
        }
    }
    best.date()
}

/// Population coefficient of variation, halved and capped at 1.0
///
/// Revenues are scaled by the largest one first, so sums stay finite.
fn volatility(dataset: &SalesDataset) -> f64 {
    let metrics = dataset.metrics();
    if metrics.len() < 2 {
        return 0.0;
    }

    let max = metrics.iter().map(|m| m.revenue()).fold(0.0_f64, f64::max);
    if max == 0.0 {
        return 0.0;
    }

    let n = metrics.len() as f64;
    let scaled = metrics.iter().map(|m| m.revenue() / max);
    let mean = scaled.clone().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = scaled.map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    if !variance.is_finite() || variance == 0.0 {
        return 0.0;
    }

    (variance.sqrt() / (mean * VOLATILITY_MULTIPLIER)).min(MAX_VOLATILITY)
}
