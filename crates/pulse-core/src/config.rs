//! Pulse configuration
//!
//! ## Configuration Resolution
//!
//! Config is resolved in three layers, later layers winning field by field:
//! 1. Embedded defaults (`config/pulse.toml`, compiled into binary)
//! 2. Override file: an explicit path, else `~/.config/pulse/pulse.toml` if present
//! 3. Environment variables:
//!    - `PULSE_AI_PROVIDER`: openrouter | gemini | mock
//!    - `PULSE_AI_API_KEY`: provider API key (blank disables AI)
//!    - `PULSE_AI_MODEL`: model identifier
//!    - `PULSE_AI_URL`: endpoint (OpenRouter) or host (Gemini)
//!    - `PULSE_AI_TIMEOUT_SECS`: per-call timeout
//!    - `PULSE_ALLOWED_ORIGINS`: comma-separated CORS allow-list

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::ai::{AIClient, GEMINI_HOST, GEMINI_MODEL, OPENROUTER_MODEL, OPENROUTER_URL};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pulse.toml");

/// AI provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    OpenRouter,
    #[default]
    Gemini,
    /// Local mock, no network or key required
    Mock,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenRouter => OPENROUTER_MODEL,
            Self::Gemini => GEMINI_MODEL,
            Self::Mock => "mock",
        }
    }

    /// URL used when none is configured
    pub fn default_url(&self) -> &'static str {
        match self {
            Self::OpenRouter => OPENROUTER_URL,
            Self::Gemini => GEMINI_HOST,
            Self::Mock => "mock://localhost",
        }
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            other => Err(format!(
                "Unknown AI provider '{}' (expected openrouter, gemini or mock)",
                other
            )),
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// AI analyzer configuration
#[derive(Clone)]
pub struct AiConfig {
    /// Master switch; false forces heuristic-only
    pub enabled: bool,
    pub provider: AiProvider,
    pub api_key: Option<String>,
    /// Provider default when unset
    pub model: Option<String>,
    /// Provider default when unset
    pub url: Option<String>,
    /// Bound on each AI call
    pub timeout: Duration,
    /// Replacement for the embedded analysis prompt
    pub prompt_path: Option<PathBuf>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: AiProvider::default(),
            api_key: None,
            model: None,
            url: None,
            timeout: Duration::from_secs(30),
            prompt_path: None,
        }
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("prompt_path", &self.prompt_path)
            .finish()
    }
}

impl AiConfig {
    /// Whether an AI call should be attempted at all
    pub fn is_active(&self) -> bool {
        self.enabled && (self.provider == AiProvider::Mock || self.api_key.is_some())
    }

    /// Why AI is inactive, for logging
    pub fn inactive_reason(&self) -> Option<&'static str> {
        if !self.enabled {
            Some("AI disabled in configuration")
        } else if !self.is_active() {
            Some("no AI API key configured")
        } else {
            None
        }
    }

    pub fn resolved_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn resolved_url(&self) -> &str {
        self.url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_url())
    }

    /// Build the provider client, or None when AI is inactive
    pub fn build_client(&self) -> Option<AIClient> {
        if !self.is_active() {
            return None;
        }
        let model = self.resolved_model();
        let url = self.resolved_url();
        let key = self.api_key.as_deref().unwrap_or_default();

        Some(match self.provider {
            AiProvider::OpenRouter => AIClient::openrouter(url, model, key),
            AiProvider::Gemini => AIClient::gemini(url, model, key),
            AiProvider::Mock => AIClient::mock(),
        })
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS allow-list; empty means same-origin only
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            allowed_origins: Vec::new(),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default)]
pub struct PulseConfig {
    pub ai: AiConfig,
    pub server: ServerConfig,
}

/// Default override location (~/.config/pulse/pulse.toml on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pulse").join("pulse.toml"))
}

impl PulseConfig {
    /// Resolve all layers, reading the process environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;

        match override_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                config.apply_file(path)?;
            }
            None => {
                if let Some(path) = default_config_path().filter(|p| p.exists()) {
                    config.apply_file(&path)?;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Built-in defaults overlaid with a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply_toml(content)?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        tracing::debug!(path = %path.display(), "Applying config override");
        self.apply_toml(&content)
    }

    /// Overlay the fields present in a TOML document
    pub fn apply_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(ai) = raw.ai {
            if let Some(enabled) = ai.enabled {
                self.ai.enabled = enabled;
            }
            if let Some(provider) = ai.provider {
                self.ai.provider = provider.parse().map_err(Error::Config)?;
            }
            if let Some(api_key) = ai.api_key {
                self.ai.api_key = non_blank(api_key);
            }
            if let Some(model) = ai.model {
                self.ai.model = non_blank(model);
            }
            if let Some(url) = ai.url {
                self.ai.url = non_blank(url);
            }
            if let Some(timeout) = ai.timeout_secs {
                self.ai.timeout = Duration::from_secs(timeout);
            }
            if let Some(path) = ai.prompt_path {
                self.ai.prompt_path = non_blank(path).map(PathBuf::from);
            }
        }

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(origins) = server.allowed_origins {
                self.server.allowed_origins = origins;
            }
        }

        Ok(())
    }

    /// Overlay environment variables, looked up through `get`
    pub fn apply_env<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = get("PULSE_AI_PROVIDER") {
            self.ai.provider = provider.parse().map_err(Error::Config)?;
        }
        if let Some(api_key) = get("PULSE_AI_API_KEY") {
            self.ai.api_key = non_blank(api_key);
        }
        if let Some(model) = get("PULSE_AI_MODEL") {
            self.ai.model = non_blank(model);
        }
        if let Some(url) = get("PULSE_AI_URL") {
            self.ai.url = non_blank(url);
        }
        if let Some(timeout) = get("PULSE_AI_TIMEOUT_SECS") {
            let secs: u64 = timeout.trim().parse().map_err(|_| {
                Error::Config(format!("PULSE_AI_TIMEOUT_SECS must be an integer, got '{}'", timeout))
            })?;
            self.ai.timeout = Duration::from_secs(secs);
        }
        if let Some(origins) = get("PULSE_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    ai: Option<RawAi>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    enabled: Option<bool>,
    provider: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    url: Option<String>,
    timeout_secs: Option<u64>,
    prompt_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
}
