//! Subcommand implementations.

pub mod config_cmd;
pub mod run;
pub mod tools;

use anyhow::Context;
use ponder_config::AppConfig;
use ponder_core::tool::ToolRegistry;
use std::path::Path;

/// Load configuration from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.context("Failed to load config")
}

/// Build the tool registry the configuration asks for.
pub fn build_registry(config: &AppConfig) -> anyhow::Result<ToolRegistry> {
    let tools = &config.tools;
    let registry = if tools.python_executor {
        ponder_tools::registry_with_python(
            &tools.searxng_url,
            tools.search_results,
            &tools.python_interpreter,
        )?
    } else {
        ponder_tools::default_registry(&tools.searxng_url, tools.search_results)?
    };
    Ok(registry)
}
