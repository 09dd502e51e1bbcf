//! Shared test helpers for agent tests.

use async_trait::async_trait;
use ponder_core::error::{ProviderError, ToolError};
use ponder_core::provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, Usage};
use ponder_core::tool::{Tool, ToolArguments, ToolParameter};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// A provider that replays scripted completions.
///
/// Each call to `complete` returns the next script entry. Once the script
/// runs out the last entry is repeated. Every request is recorded so tests
/// can inspect what the loop sent.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    last: Mutex<Option<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(completions: impl IntoIterator<Item = S>) -> Self {
        Self::with_results(completions.into_iter().map(|c| Ok(c.into())))
    }

    pub fn with_results(results: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that always returns the same completion.
    pub fn always(completion: &str) -> Self {
        Self::new([completion])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);

        let next = self.script.lock().unwrap().pop_front();
        let result = match next {
            Some(result) => {
                *self.last.lock().unwrap() = Some(result.clone());
                result
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .expect("ScriptedProvider: empty script"),
        };

        result.map(|content| ProviderResponse {
            content,
            format: ResponseFormat::Text,
            model,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }
}

/// A provider that never answers within any reasonable deadline.
pub struct HangingProvider;

#[async_trait]
impl Provider for HangingProvider {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ProviderError::Network("unreachable".into()))
    }
}

/// A tool that always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "Always fails."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![]
    }

    async fn execute(&self, _arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
        Err(ToolError::ExecutionFailed("disk on fire".into()))
    }
}

/// A tool that sleeps for an hour.
pub struct SleepyTool;

#[async_trait]
impl Tool for SleepyTool {
    fn name(&self) -> &str {
        "sleepy"
    }

    fn description(&self) -> &str {
        "Takes forever."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![]
    }

    async fn execute(&self, _arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(serde_json::Value::Null)
    }
}

/// A tool whose body panics.
pub struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "panicking"
    }

    fn description(&self) -> &str {
        "Panics when called."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![]
    }

    async fn execute(&self, _arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
        panic!("tool internal failure")
    }
}
