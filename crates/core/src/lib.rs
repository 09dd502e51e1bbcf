//! # Ponder Core
//!
//! Domain types, traits, and error definitions for the Ponder ReAct agent.
//! This crate has **no async runtime dependency**; it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the loop controller is a trait here:
//! - [`Provider`]: the language-model client
//! - [`TranscriptStore`]: the append-only history of turns
//! - [`Tool`]: a capability the model can invoke by name
//!
//! Implementations live in their respective crates, so tests can swap in
//! scripted providers and in-memory stores.

pub mod agent;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod transcript;

// Re-export key types at crate root for ergonomics
pub use agent::AgentConfig;
pub use error::{Error, Result};
pub use message::{Role, Turn};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat, StopSequences};
pub use tool::{Tool, ToolArguments, ToolDescriptor, ToolParameter, ToolRegistry};
pub use transcript::TranscriptStore;
