//! Tool dispatch: resolve a parsed action and turn its outcome into an
//! observation string.
//!
//! Nothing a tool does escapes as an error. Unknown names, argument
//! mismatches, failures, timeouts and cancellation all come back as text
//! the model can read on its next iteration.

use ponder_core::error::ToolError;
use ponder_core::tool::{Tool, ToolArguments, ToolRegistry, render_value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct ToolDispatcher {
    tools: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(tools: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { tools, timeout }
    }

    /// Invoke `name` with `arguments` and return the observation text.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: ToolArguments,
        cancel: &CancellationToken,
    ) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "Model requested an unknown tool");
            return format!(
                "Error: Tool '{}' not found. Available tools: {}",
                name,
                self.tools.names().join(", ")
            );
        };

        debug!(tool = %name, args = arguments.len(), "Dispatching tool call");

        match self.call(tool, arguments, cancel).await {
            Ok(value) => format!("Observation: {}", render_value(&value)),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool call failed");
                format!("Error executing tool '{name}': {e}")
            }
        }
    }

    async fn call(
        &self,
        tool: &Arc<dyn Tool>,
        arguments: ToolArguments,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, ToolError> {
        check_arguments(tool.as_ref(), &arguments)?;

        // Spawned so a panicking tool surfaces as a JoinError.
        let tool = Arc::clone(tool);
        let mut task = tokio::spawn(async move { tool.execute(arguments).await });

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ToolError::Cancelled),
            joined = tokio::time::timeout(self.timeout, &mut task) => match joined {
                Ok(Ok(result)) => result,
                Ok(Err(e)) if e.is_panic() => Err(ToolError::ExecutionFailed(format!(
                    "tool panicked: {}",
                    panic_message(e.into_panic())
                ))),
                Ok(Err(e)) => Err(ToolError::ExecutionFailed(e.to_string())),
                Err(_) => Err(ToolError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }),
            },
        };

        task.abort();
        outcome
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown cause".into()),
    }
}

/// Arguments are applied by name: every required parameter must be present
/// and nothing undeclared may be passed.
fn check_arguments(tool: &dyn Tool, arguments: &ToolArguments) -> Result<(), ToolError> {
    let declared = tool.parameters();

    if let Some(missing) = declared
        .iter()
        .find(|p| p.required && !arguments.contains_key(&p.name))
    {
        return Err(ToolError::InvalidArguments(format!(
            "missing required argument '{}'",
            missing.name
        )));
    }

    if let Some(unexpected) = arguments
        .keys()
        .find(|k| !declared.iter().any(|p| &p.name == *k))
    {
        return Err(ToolError::InvalidArguments(format!(
            "unexpected argument '{unexpected}'"
        )));
    }

    Ok(())
}
