//! Analysis prompt template
//!
//! The default template is compiled into the binary. A replacement file can
//! be supplied through `ai.prompt_path`; it must keep the `{{data}}`
//! placeholder, which is replaced by the dataset serialized as JSON.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Metric, SalesDataset};

/// Embedded default prompt (compiled into binary)
const ANALYZE_SALES: &str = include_str!("../../../../prompts/analyze_sales.md");

const DATA_PLACEHOLDER: &str = "{{data}}";

/// Payload embedded in the prompt
#[derive(Serialize)]
struct PromptData<'a> {
    timezone: &'a str,
    period_start: String,
    period_end: String,
    metrics: &'a [Metric],
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: ANALYZE_SALES.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Use a template from a string
    pub fn from_template(template: &str) -> Result<Self> {
        if !template.contains(DATA_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "Prompt template must contain the {} placeholder",
                DATA_PLACEHOLDER
            )));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    /// Load the override file if given, else the embedded default
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!(
                        "Failed to read prompt {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_template(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// Render the prompt for a dataset
    pub fn render(&self, dataset: &SalesDataset) -> Result<String> {
        let data = PromptData {
            timezone: dataset.timezone(),
            period_start: dataset.period_start().format("%Y-%m-%d").to_string(),
            period_end: dataset.period_end().format("%Y-%m-%d").to_string(),
            metrics: dataset.metrics(),
        };
        let json = serde_json::to_string(&data)?;
        Ok(self.template.replace(DATA_PLACEHOLDER, &json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_dataset;

    #[test]
    fn test_default_template_has_placeholder_and_rules() {
        let template = PromptTemplate::default();
        assert!(template.template.contains(DATA_PLACEHOLDER));
        for field in [
            "best_day_date",
            "best_day_weekday",
            "score",
            "reason",
            "volatility",
            "insights",
        ] {
            assert!(template.template.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_render_embeds_dataset() {
        let prompt = PromptTemplate::default().render(&sample_dataset()).unwrap();
        assert!(!prompt.contains(DATA_PLACEHOLDER));
        assert!(prompt.contains(r#"{"timezone":"America/Sao_Paulo","period_start":"2024-01-01""#));
        assert!(prompt.contains(r#"{"date":"2024-01-02","revenue":300.0,"transactions":10,"ticket":30.0}"#));
    }

    #[test]
    fn test_custom_template_requires_placeholder() {
        assert!(PromptTemplate::from_template("no placeholder").is_err());
        let t = PromptTemplate::from_template("DATA: {{data}}").unwrap();
        let prompt = t.render(&sample_dataset()).unwrap();
        assert!(prompt.starts_with("DATA: {\"timezone\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "Custom {{data}}").unwrap();

        let t = PromptTemplate::load(Some(&path)).unwrap();
        assert!(t.render(&sample_dataset()).unwrap().starts_with("Custom {"));

        let missing = dir.path().join("missing.md");
        assert!(matches!(
            PromptTemplate::load(Some(&missing)),
            Err(Error::Config(_))
        ));
    }
}
