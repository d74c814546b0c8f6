//! Workflow state — the object threaded through every step of one run.

use taskweave_core::reflection::Reflection;
use taskweave_core::result::TaskResult;
use taskweave_core::task::Task;

/// Mutable state for one query's lifetime.
///
/// Created once per incoming query, mutated in place by each step of the
/// engine, and frozen into a [`RunOutcome`] once the terminal step has
/// produced a final response or a fatal error. The engine owns it
/// exclusively; adapters only ever see read-only slices.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    /// The original query text.
    pub query: String,

    /// Current task list.
    pub tasks: Vec<Task>,

    /// Results for the current round, one per task, in task order.
    pub results: Vec<TaskResult>,

    /// The current round's verdict, once reflection has run.
    pub reflection: Option<Reflection>,

    /// Accumulated final response text.
    pub final_response: String,

    /// Completed decision rounds.
    pub iteration: u32,

    /// Configured iteration budget.
    pub max_iterations: u32,

    /// Fatal error, if one occurred. Forces termination regardless of the
    /// iteration budget.
    pub error_message: Option<String>,
}

impl WorkflowState {
    pub fn new(query: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            query: query.into(),
            tasks: Vec::new(),
            results: Vec::new(),
            reflection: None,
            final_response: String::new(),
            iteration: 0,
            max_iterations,
            error_message: None,
        }
    }
}

/// The outcome of one workflow run — the engine's entire public surface.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// True iff no fatal error occurred.
    pub success: bool,

    /// The synthesized response, or the fatal error message verbatim.
    pub response: String,

    /// The final task list, even on failure, to aid diagnostics.
    pub tasks: Vec<Task>,

    /// The final result list, even on failure.
    pub results: Vec<TaskResult>,
}

impl From<WorkflowState> for RunOutcome {
    fn from(state: WorkflowState) -> Self {
        Self {
            success: state.error_message.is_none(),
            response: state.final_response,
            tasks: state.tasks,
            results: state.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_empty() {
        let state = WorkflowState::new("q", 3);
        assert_eq!(state.iteration, 0);
        assert!(state.tasks.is_empty());
        assert!(state.results.is_empty());
        assert!(state.reflection.is_none());
        assert!(state.error_message.is_none());
    }

    #[test]
    fn outcome_success_mirrors_error_flag() {
        let mut state = WorkflowState::new("q", 3);
        state.final_response = "done".into();
        let outcome = RunOutcome::from(state.clone());
        assert!(outcome.success);
        assert_eq!(outcome.response, "done");

        state.error_message = Some("boom".into());
        let outcome = RunOutcome::from(state);
        assert!(!outcome.success);
    }
}
