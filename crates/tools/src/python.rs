//! Python execution tool: runs a snippet in a fresh interpreter.
//!
//! The snippet is piped to `<interpreter> -I -` and whatever it prints
//! becomes the result. The child process is killed when the call is
//! dropped, so the dispatcher's timeout and cancellation stop it too.

use async_trait::async_trait;
use ponder_core::error::ToolError;
use ponder_core::tool::{Tool, ToolArguments, ToolParameter, required_str};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

const NO_OUTPUT: &str = "Code executed successfully with no output.";

pub struct PythonExecutorTool {
    interpreter: String,
}

impl PythonExecutorTool {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

/// Drop a surrounding Markdown code fence, if any.
fn strip_fence(code: &str) -> &str {
    let trimmed = code.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body
        .strip_prefix("python")
        .or_else(|| body.strip_prefix("py"))
        .unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[async_trait]
impl Tool for PythonExecutorTool {
    fn name(&self) -> &str {
        "python_executor"
    }

    fn description(&self) -> &str {
        "Execute Python code and return what it prints. Use print() to report results; each call starts a fresh interpreter."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required(
            "code",
            "str",
            "The Python code to execute.",
        )]
    }

    async fn execute(&self, arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
        let code = strip_fence(required_str(&arguments, "code")?);
        if code.is_empty() {
            return Err(ToolError::InvalidArguments("code must not be empty".into()));
        }
        debug!(interpreter = %self.interpreter, bytes = code.len(), "Running python snippet");

        let mut child = Command::new(&self.interpreter)
            .arg("-I")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ToolError::ExecutionFailed(format!("Failed to start '{}': {e}", self.interpreter))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolError::ExecutionFailed("interpreter stdin is unavailable".into()))?;
        stdin
            .write_all(code.as_bytes())
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to send code: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed waiting for interpreter: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

        if !output.status.success() {
            warn!(status = %output.status, "Python snippet failed");
            return Err(ToolError::ExecutionFailed(if stderr.is_empty() {
                format!("interpreter exited with {}", output.status)
            } else {
                stderr
            }));
        }

        let text = match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => NO_OUTPUT.to_string(),
            (false, true) => stdout,
            (true, false) => format!("[stderr]\n{stderr}"),
            (false, false) => format!("{stdout}\n[stderr]\n{stderr}"),
        };
        Ok(serde_json::Value::String(text))
    }
}
