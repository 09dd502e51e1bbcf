//! Agent configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;

/// Configuration for the agent's behavior.
///
/// Immutable for the lifetime of an agent; checked by [`AgentConfig::validate`]
/// when the agent is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum model calls per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// How many recent turns are sent to the model each iteration
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Deadline for a single model call
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,

    /// Deadline for a single tool call
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

fn default_model() -> String {
    "qwen-plus".into()
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
fn default_model_timeout_secs() -> u64 {
    60
}
fn default_tool_timeout_secs() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_iterations: default_max_iterations(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            history_window: default_history_window(),
            model_timeout_secs: default_model_timeout_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

impl AgentConfig {
    /// Set max iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), Error> {
        let fail = |message: &str| {
            Err(Error::Config {
                message: message.into(),
            })
        };

        if self.max_iterations < 1 {
            return fail("max_iterations must be at least 1");
        }
        if self.max_tokens < 1 {
            return fail("max_tokens must be at least 1");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return fail("temperature must be between 0.0 and 2.0");
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return fail("top_p must be in (0.0, 1.0]");
        }
        if self.history_window < 1 {
            return fail("history_window must be at least 1");
        }
        if self.model.trim().is_empty() {
            return fail("model must not be empty");
        }
        if self.model_timeout_secs == 0 || self.tool_timeout_secs == 0 {
            return fail("timeouts must be at least one second");
        }
        Ok(())
    }
}
