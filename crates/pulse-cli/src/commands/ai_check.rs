//! AI provider check command

use std::io::Write;

use anyhow::Result;
use pulse_core::{AIBackend, AiAnalyzer, PulseConfig, RawMetric, SalesAnalysisRequest};

/// A small payload for the end-to-end check
fn sample_payload() -> SalesAnalysisRequest {
    let metric = |date: &str, revenue: f64, transactions: i64| RawMetric {
        date: Some(date.to_string()),
        revenue: Some(revenue),
        transactions: Some(transactions),
        ticket: None,
    };
    SalesAnalysisRequest {
        timezone: Some("UTC".to_string()),
        period_start: Some("2024-01-01".to_string()),
        period_end: Some("2024-01-07".to_string()),
        metrics: vec![
            metric("2024-01-01", 120.0, 6),
            metric("2024-01-02", 340.0, 14),
            metric("2024-01-05", 410.0, 15),
        ],
    }
}

pub async fn cmd_ai_check(config: &PulseConfig) -> Result<()> {
    run_ai_check(config, &mut std::io::stdout()).await
}

/// Write the AI check report to `out`
///
/// Progress prefixes are flushed before each provider call.
pub async fn run_ai_check<W: Write>(config: &PulseConfig, out: &mut W) -> Result<()> {
    let ai = &config.ai;

    writeln!(out, "🤖 AI configuration")?;
    writeln!(out, "   Enabled:  {}", ai.enabled)?;
    writeln!(out, "   Provider: {}", ai.provider)?;
    writeln!(out, "   Model:    {}", ai.resolved_model())?;
    writeln!(out, "   URL:      {}", ai.resolved_url())?;
    writeln!(
        out,
        "   API key:  {}",
        if ai.api_key.is_some() { "set" } else { "not set" }
    )?;
    writeln!(out, "   Timeout:  {:?}", ai.timeout)?;
    if let Some(path) = &ai.prompt_path {
        writeln!(out, "   Prompt:   {}", path.display())?;
    }
    writeln!(out)?;

    let Some(analyzer) = AiAnalyzer::from_config(ai)? else {
        writeln!(
            out,
            "ℹ️  AI inactive: {}",
            ai.inactive_reason().unwrap_or("unknown reason")
        )?;
        writeln!(out, "   Analysis will use the heuristic only.")?;
        return Ok(());
    };

    let client = analyzer.client();
    write!(out, "Checking {} at {}... ", client.provider(), client.host())?;
    out.flush()?;
    if client.health_check().await {
        writeln!(out, "✅ Connected")?;
    } else {
        writeln!(out, "❌ Failed")?;
        writeln!(
            out,
            "\n   Check the API key and URL, or set PULSE_AI_URL to a reachable endpoint."
        )?;
        return Ok(());
    }

    write!(out, "Running a sample analysis... ")?;
    out.flush()?;
    let dataset = sample_payload().into_dataset()?;
    match analyzer.try_analyze(&dataset).await {
        Ok(result) => {
            writeln!(out, "✅ Valid reply")?;
            writeln!(
                out,
                "   Best day: {} (score {:.2})",
                result.best_date(),
                result.score()
            )?;
        }
        Err(e) => {
            writeln!(out, "❌ Unusable reply")?;
            writeln!(out, "   {}", e)?;
            writeln!(out, "   Requests would fall back to the heuristic.")?;
        }
    }

    Ok(())
}
