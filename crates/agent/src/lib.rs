//! The ReAct agent loop for Ponder.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Render** the system prompt from the tool registry
//! 2. **Send** the most recent transcript turns to the model
//! 3. **Parse** the completion: final answer, tool action, or neither
//! 4. **If action**: dispatch the tool, append the observation, loop back to 2
//! 5. **If answer**: return it
//!
//! The loop stops at the first answer or when the iteration budget is spent.

pub mod dispatcher;
pub mod parser;
pub mod prompt;
pub mod react;
pub mod state;

pub use dispatcher::ToolDispatcher;
pub use parser::{Parsed, ParsedAction, parse};
pub use react::{ReactAgent, ReactResult};
pub use state::{FALLBACK_RESPONSE, LoopState, Outcome};

#[cfg(test)]
pub(crate) mod test_helpers;
