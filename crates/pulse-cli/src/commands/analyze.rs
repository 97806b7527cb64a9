//! Analyze command implementation

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use pulse_core::{
    weekday_name, AnalysisOrchestrator, AnalysisOutcome, AnalysisResponse, HeuristicAnalyzer,
    PulseConfig, SalesAnalysisRequest, SalesDataset,
};

/// Read a request payload from a file, or stdin when the path is `-`
pub fn load_request(path: &Path) -> Result<SalesAnalysisRequest> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid sales payload in {}", path.display()))
}

/// Validate a payload and run the orchestrator on it
pub async fn analyze_request(
    config: &PulseConfig,
    request: SalesAnalysisRequest,
    no_ai: bool,
) -> Result<(SalesDataset, AnalysisOutcome)> {
    let dataset = request.into_dataset().context("Invalid sales data")?;

    let orchestrator = if no_ai {
        AnalysisOrchestrator::heuristic_only()
    } else {
        AnalysisOrchestrator::from_config(&config.ai)?
    };

    let outcome = orchestrator.run(&dataset).await?;
    Ok((dataset, outcome))
}

pub async fn cmd_analyze(config: &PulseConfig, file: &Path, no_ai: bool, json: bool) -> Result<()> {
    let request = load_request(file)?;
    let (dataset, outcome) = analyze_request(config, request, no_ai).await?;

    if json {
        let response = AnalysisResponse::from(&outcome.result);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", format_summary(&dataset, &outcome));
    }

    Ok(())
}

/// Human-readable report of an outcome
pub fn format_summary(dataset: &SalesDataset, outcome: &AnalysisOutcome) -> String {
    let result = &outcome.result;
    let mut out = String::new();

    out.push_str(&format!(
        "📈 Sales analysis: {} to {} ({}, {} days of data)\n\n",
        dataset.period_start(),
        dataset.period_end(),
        dataset.timezone(),
        dataset.len()
    ));
    out.push_str(&format!(
        "🏆 Best day: {} ({})\n",
        weekday_name(result.best_weekday()),
        result.best_date()
    ));
    out.push_str(&format!("   Score:      {:.2}\n", result.score()));
    out.push_str(&format!("   Volatility: {:.3}\n", result.volatility()));
    out.push_str(&format!("   Source:     {}\n", outcome.source));
    out.push_str(&format!("   Reason:     {}\n", result.reason()));

    if !outcome.source.is_ai() {
        out.push_str("\n📊 Average revenue by weekday:\n");
        for avg in HeuristicAnalyzer::weekday_averages(dataset) {
            out.push_str(&format!(
                "   {:<10} {:>12.2}  ({} day{})\n",
                weekday_name(avg.weekday),
                avg.mean,
                avg.count,
                if avg.count == 1 { "" } else { "s" }
            ));
        }
    }

    out.push_str("\n💡 Insights:\n");
    for insight in result.insights() {
        out.push_str(&format!("   • {}\n", insight));
    }

    out
}
