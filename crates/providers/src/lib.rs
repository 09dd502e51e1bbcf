//! Model client implementations for Ponder.
//!
//! All providers implement the `ponder_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use ponder_config::AppConfig;
use ponder_core::error::ProviderError;

/// Build the provider described by `config`.
///
/// Any OpenAI-compatible base URL works; the API key is required unless the
/// base URL points at a local Ollama server.
pub fn from_config(config: &AppConfig) -> Result<OpenAiCompatProvider, ProviderError> {
    let is_local = config.base_url.contains("localhost:11434");
    match (&config.api_key, is_local) {
        (_, true) => Ok(OpenAiCompatProvider::ollama(Some(&config.base_url))),
        (Some(key), false) => Ok(OpenAiCompatProvider::new(
            provider_name(&config.base_url),
            &config.base_url,
            key,
        )),
        (None, false) => Err(ProviderError::NotConfigured(
            "no API key; set PONDER_API_KEY or api_key in config.toml".into(),
        )),
    }
}

fn provider_name(base_url: &str) -> &'static str {
    if base_url.contains("dashscope") {
        "dashscope"
    } else if base_url.contains("api.openai.com") {
        "openai"
    } else {
        "openai-compatible"
    }
}
