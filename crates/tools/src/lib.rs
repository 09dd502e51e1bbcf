//! Built-in tool implementations for Ponder.
//!
//! Tools give the agent the ability to act: evaluate arithmetic, search
//! the web through a SearxNG instance and, when enabled, run Python.

pub mod calculator;
pub mod python;
pub mod web_search;

pub use calculator::CalculatorTool;
pub use python::PythonExecutorTool;
pub use web_search::WebSearchTool;

use ponder_core::error::ToolError;
use ponder_core::tool::ToolRegistry;

/// Create a tool registry with all built-in tools.
///
/// Registration order is the catalogue order: `calculator`, then
/// `web_search`.
pub fn default_registry(
    searxng_url: &str,
    search_results: usize,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(CalculatorTool)?;
    registry.register(WebSearchTool::new(searxng_url, search_results))?;
    Ok(registry)
}

/// The default tools followed by `python_executor` running `interpreter`.
pub fn registry_with_python(
    searxng_url: &str,
    search_results: usize,
    interpreter: &str,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = default_registry(searxng_url, search_results)?;
    registry.register(PythonExecutorTool::new(interpreter))?;
    Ok(registry)
}
