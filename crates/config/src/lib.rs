//! Configuration loading and validation for Dataloom.
//!
//! Loads configuration from `~/.dataloom/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.dataloom/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the reasoning service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Agent loop settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Retry/backoff settings for the model gateway.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Reasoning-service settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Code execution sidecar settings.
    #[serde(default)]
    pub executor: ExecutorConfig,
}

/// Settings for the orchestration loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum loop iterations per query.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Conversation memory ring capacity.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Turns rendered into each prompt.
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Character budget for per-turn result summaries.
    #[serde(default = "default_summary_budget")]
    pub summary_budget: usize,
}

/// Settings for the gateway's retry state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay in seconds; doubles per attempt.
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: f64,
}

/// Settings for the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the API base URL (proxies, tests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Sampling temperature for decision prompts.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Settings for the external code execution service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Endpoint of the execution sidecar.
    #[serde(default = "default_executor_endpoint")]
    pub endpoint: String,
}

fn default_max_iterations() -> u32 {
    20
}
fn default_memory_capacity() -> usize {
    50
}
fn default_context_window() -> usize {
    3
}
fn default_summary_budget() -> usize {
    500
}
fn default_max_retries() -> u32 {
    3
}
fn default_base_delay_secs() -> f64 {
    2.0
}
fn default_model() -> String {
    "gemini-1.5-pro".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_executor_endpoint() -> String {
    "http://127.0.0.1:8791".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("agent", &self.agent)
            .field("retry", &self.retry)
            .field("provider", &self.provider)
            .field("executor", &self.executor)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path with env-var overrides.
    ///
    /// `DATALOOM_API_KEY` (falling back to `GOOGLE_API_KEY`) overrides the
    /// API key; `DATALOOM_MODEL` overrides the model.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_dir().join("config.toml"))?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("DATALOOM_API_KEY")
                .ok()
                .or_else(|| std::env::var("GOOGLE_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("DATALOOM_MODEL") {
            config.provider.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".dataloom")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.agent.memory_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "agent.memory_capacity must be at least 1".into(),
            ));
        }

        if self.retry.base_delay_secs <= 0.0 {
            return Err(ConfigError::ValidationError(
                "retry.base_delay_secs must be positive".into(),
            ));
        }

        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            agent: AgentConfig::default(),
            retry: RetryConfig::default(),
            provider: ProviderConfig::default(),
            executor: ExecutorConfig::default(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            memory_capacity: default_memory_capacity(),
            context_window: default_context_window(),
            summary_budget: default_summary_budget(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_secs: default_base_delay_secs(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
            temperature: default_temperature(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_executor_endpoint(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
