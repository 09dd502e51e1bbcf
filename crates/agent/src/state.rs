//! Per-run loop state.

/// Reply used when a run ends without an answer.
pub const FALLBACK_RESPONSE: &str =
    "I'm sorry, I couldn't complete the task within the allowed iterations.";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The model produced an `Answer:`
    Answered,
    /// The iteration budget ran out first
    BudgetExhausted,
}

/// State owned by a single run. Created fresh for every run and never
/// shared between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    pub iteration: u32,
    pub is_complete: bool,
    pub final_response: Option<String>,
    pub outcome: Option<Outcome>,
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another iteration may start under `max_iterations`.
    pub fn can_continue(&self, max_iterations: u32) -> bool {
        !self.is_complete && self.iteration < max_iterations
    }

    /// Start the next iteration and return its 1-based number.
    pub fn advance(&mut self) -> u32 {
        self.iteration += 1;
        self.iteration
    }

    pub fn answer(&mut self, response: impl Into<String>) {
        self.finish(response.into(), Outcome::Answered);
    }

    pub fn exhaust(&mut self) {
        self.finish(FALLBACK_RESPONSE.to_string(), Outcome::BudgetExhausted);
    }

    fn finish(&mut self, response: String, outcome: Outcome) {
        self.final_response = Some(response);
        self.outcome = Some(outcome);
        self.is_complete = true;
    }
}
