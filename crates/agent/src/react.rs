//! ReAct loop controller: Thought → Action → Observation until an answer.
//!
//! Every run appends to the shared transcript:
//!
//! 1. a system turn with the rendered prompt and a user turn with the goal
//! 2. per iteration, the model's completion as an assistant turn
//! 3. for each tool action, the dispatcher's observation
//!
//! The run ends on the first `Answer:` or when the iteration budget is spent.
//! Budget exhaustion is a normal outcome with a fixed reply; only model and
//! transcript failures surface as errors.

use ponder_core::agent::AgentConfig;
use ponder_core::error::{Error, ProviderError, Result};
use ponder_core::message::Turn;
use ponder_core::provider::{Provider, ProviderRequest, ProviderResponse, ResponseFormat};
use ponder_core::tool::ToolRegistry;
use ponder_core::transcript::TranscriptStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::dispatcher::ToolDispatcher;
use crate::parser::{self, Parsed};
use crate::prompt;
use crate::state::{LoopState, Outcome};

/// A ReAct agent over a provider, a tool registry and a transcript.
pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    transcript: Arc<dyn TranscriptStore>,
    dispatcher: ToolDispatcher,
    config: AgentConfig,
}

/// The result of a ReAct execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactResult {
    /// The final answer, or the fallback reply
    pub answer: String,
    /// Model calls made
    pub iterations: u32,
    /// Tool actions dispatched
    pub tool_calls_made: usize,
    pub outcome: Outcome,
}

impl ReactAgent {
    /// Create a new ReAct agent. Fails if `config` does not validate.
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        transcript: Arc<dyn TranscriptStore>,
        config: AgentConfig,
    ) -> Result<Self> {
        config.validate()?;
        let dispatcher = ToolDispatcher::new(tools.clone(), config.tool_timeout());
        Ok(Self {
            provider,
            tools,
            transcript,
            dispatcher,
            config,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn transcript(&self) -> &Arc<dyn TranscriptStore> {
        &self.transcript
    }

    /// The system prompt a run starts with.
    pub fn system_prompt(&self) -> String {
        prompt::render_system_prompt(&self.tools)
    }

    /// Run to completion and return the answer.
    pub async fn run(&self, goal: &str) -> Result<String> {
        Ok(self.execute(goal).await?.answer)
    }

    /// Run with a cancellation token observed at each model and tool call.
    pub async fn run_with_cancel(&self, goal: &str, cancel: CancellationToken) -> Result<String> {
        Ok(self.execute_with_cancel(goal, cancel).await?.answer)
    }

    /// Drive a run on a private current-thread runtime.
    ///
    /// Must not be called from inside an async runtime.
    pub fn run_blocking(&self, goal: &str) -> Result<String> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Internal(
                "run_blocking called from inside an async runtime; use run instead".into(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to start runtime: {e}")))?;
        runtime.block_on(self.run(goal))
    }

    /// Run to completion and report how it went.
    pub async fn execute(&self, goal: &str) -> Result<ReactResult> {
        self.execute_with_cancel(goal, CancellationToken::new()).await
    }

    #[instrument(
        name = "react.run",
        skip(self, goal, cancel),
        fields(model = %self.config.model, max_iter = self.config.max_iterations)
    )]
    pub async fn execute_with_cancel(
        &self,
        goal: &str,
        cancel: CancellationToken,
    ) -> Result<ReactResult> {
        let mut state = LoopState::new();
        let mut tool_calls_made = 0usize;

        info!(provider = %self.provider.name(), tools = self.tools.len(), "ReAct loop starting");

        self.transcript.add(Turn::system(self.system_prompt())).await?;
        self.transcript.add(Turn::user(goal)).await?;

        while state.can_continue(self.config.max_iterations) {
            let step = state.advance();
            if self.iterate(step, &mut state, &cancel).await? {
                tool_calls_made += 1;
            }
        }

        if !state.is_complete {
            warn!(max_iter = self.config.max_iterations, "ReAct: max iterations reached");
            state.exhaust();
        }

        let outcome = state.outcome.unwrap_or(Outcome::BudgetExhausted);
        let answer = state.final_response.unwrap_or_default();

        info!(
            iterations = state.iteration,
            tool_calls = tool_calls_made,
            ?outcome,
            "ReAct loop completed"
        );

        Ok(ReactResult {
            answer,
            iterations: state.iteration,
            tool_calls_made,
            outcome,
        })
    }

    /// One model call and its consequences. Returns whether a tool ran.
    #[instrument(name = "react.iteration", skip_all, fields(iteration = step))]
    async fn iterate(
        &self,
        step: u32,
        state: &mut LoopState,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let turns = self.transcript.recent(self.config.history_window).await?;
        debug!(turns = turns.len(), "ReAct iteration");

        let request = ProviderRequest {
            model: self.config.model.clone(),
            turns,
            temperature: self.config.temperature,
            max_tokens: Some(self.config.max_tokens),
            top_p: self.config.top_p,
            stop: None,
            response_format: ResponseFormat::Text,
        };

        let completion = self.complete(request, cancel).await?.content;
        self.transcript
            .add(Turn::assistant(completion.as_str()).with_metadata("step", step))
            .await?;

        match parser::parse(&completion) {
            Parsed::FinalAnswer(answer) => {
                debug!("Final answer found");
                state.answer(answer);
                Ok(false)
            }
            Parsed::Action(action) => {
                let observation = self
                    .dispatcher
                    .invoke(&action.tool, action.arguments, cancel)
                    .await;
                self.transcript
                    .add(
                        Turn::observation(observation)
                            .with_metadata("step", step)
                            .with_metadata("tool", action.tool),
                    )
                    .await?;
                Ok(true)
            }
            Parsed::Unparseable => {
                debug!("Completion has neither an action nor an answer");
                if step >= self.config.max_iterations {
                    warn!("Last iteration produced no answer");
                    state.exhaust();
                }
                Ok(false)
            }
        }
    }

    /// Call the model under the configured deadline and `cancel`.
    async fn complete(
        &self,
        request: ProviderRequest,
        cancel: &CancellationToken,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProviderError::Cancelled),
            result = tokio::time::timeout(self.config.model_timeout(), self.provider.complete(request)) => {
                result.unwrap_or(Err(ProviderError::Timeout(self.config.model_timeout_secs)))
            }
        }
    }
}
