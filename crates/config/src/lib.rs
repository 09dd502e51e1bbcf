//! Configuration loading, validation, and management for Ponder.
//!
//! Loads configuration from `~/.ponder/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use ponder_core::agent::AgentConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ponder/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Loop and sampling settings
    #[serde(default)]
    pub agent: AgentSection,

    /// Where turns are kept
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_base_url() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".into()
}
fn default_model() -> String {
    "qwen-plus".into()
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
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("agent", &self.agent)
            .field("transcript", &self.transcript)
            .field("tools", &self.tools)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Recent turns sent to the model per iteration
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    #[serde(default = "default_timeout_secs")]
    pub model_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub tool_timeout_secs: u64,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_max_tokens() -> u32 {
    8190
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_history_window() -> usize {
    10
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            history_window: default_history_window(),
            model_timeout_secs: default_timeout_secs(),
            tool_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which transcript store backs a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptBackend {
    /// Turns live only as long as the process
    #[default]
    Memory,
    /// Turns are appended to a JSONL file
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptConfig {
    #[serde(default)]
    pub backend: TranscriptBackend,

    /// File path for the `file` backend (defaults under `~/.ponder`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// SearxNG instance for the web search tool
    #[serde(default = "default_searxng_url")]
    pub searxng_url: String,

    /// Results returned per search
    #[serde(default = "default_search_results")]
    pub search_results: usize,

    /// Register the `python_executor` tool (runs model-written code)
    #[serde(default)]
    pub python_executor: bool,

    /// Interpreter used by `python_executor`
    #[serde(default = "default_python_interpreter")]
    pub python_interpreter: String,
}

fn default_searxng_url() -> String {
    "http://localhost:8888".into()
}
fn default_search_results() -> usize {
    3
}
fn default_python_interpreter() -> String {
    "python3".into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            searxng_url: default_searxng_url(),
            search_results: default_search_results(),
            python_executor: false,
            python_interpreter: default_python_interpreter(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ponder/config.toml).
    ///
    /// Also checks environment variables:
    /// - `PONDER_API_KEY` (highest priority), `DASHSCOPE_API_KEY`, `OPENAI_API_KEY`
    /// - `PONDER_BASE_URL`
    /// - `PONDER_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
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

    /// Apply environment overrides through `lookup`.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("PONDER_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            self.api_key = lookup("DASHSCOPE_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(url) = lookup("PONDER_BASE_URL") {
            self.base_url = url;
        }

        if let Some(model) = lookup("PONDER_MODEL") {
            self.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ponder")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agent_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url must not be empty".into(),
            ));
        }

        if self.tools.python_executor && self.tools.python_interpreter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tools.python_interpreter must not be empty".into(),
            ));
        }

        if self.tools.search_results == 0 {
            return Err(ConfigError::ValidationError(
                "tools.search_results must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// The loop configuration for an agent built from this file.
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            model: self.model.clone(),
            max_iterations: self.agent.max_iterations,
            max_tokens: self.agent.max_tokens,
            temperature: self.agent.temperature,
            top_p: self.agent.top_p,
            history_window: self.agent.history_window,
            model_timeout_secs: self.agent.model_timeout_secs,
            tool_timeout_secs: self.agent.tool_timeout_secs,
        }
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Render this configuration as TOML with the API key removed.
    pub fn to_redacted_toml(&self) -> String {
        let mut redacted = self.clone();
        redacted.api_key = redacted.api_key.map(|_| "[REDACTED]".into());
        toml::to_string_pretty(&redacted).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            agent: AgentSection::default(),
            transcript: TranscriptConfig::default(),
            tools: ToolsConfig::default(),
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
