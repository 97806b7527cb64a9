//! Shared command utilities

use std::path::Path;

use anyhow::{Context, Result};
use pulse_core::PulseConfig;

/// Resolve configuration (embedded defaults, override file, environment)
pub fn load_config(path: Option<&Path>) -> Result<PulseConfig> {
    let config = PulseConfig::load(path).context("Failed to load configuration")?;
    tracing::debug!(config = ?config, "Configuration resolved");
    Ok(config)
}
