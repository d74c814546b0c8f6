//! The iteration controller — drives the plan→execute→reflect→(refine→
//! execute→reflect)*→respond loop and owns the continue/stop decision.
//!
//! Every adapter failure is contained here: planning and reflection
//! infrastructure failures set the fatal-error field, execution failures
//! stay per-task. Nothing escapes `run` — it always returns the documented
//! outcome shape, and the iteration budget bounds the number of refine
//! transitions for any sequence of verdicts.

use taskweave_agents::{Planner, Reflector, ToolExecutor};
use taskweave_core::reflection::Reflection;
use taskweave_core::task::TaskStatus;
use tracing::{debug, error, info, warn};

use crate::refine::apply_refinements;
use crate::response::synthesize;
use crate::state::{RunOutcome, WorkflowState};

/// The engine's states. `Respond` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Plan,
    Execute,
    Reflect,
    Decide,
    Refine,
    Respond,
}

/// The workflow engine.
pub struct Workflow {
    planner: Planner,
    executor: ToolExecutor,
    reflector: Reflector,
}

impl Workflow {
    pub fn new(planner: Planner, executor: ToolExecutor, reflector: Reflector) -> Self {
        Self {
            planner,
            executor,
            reflector,
        }
    }

    /// Run one query to completion.
    ///
    /// This is the entire public surface of the engine. The state is private
    /// to this run; concurrent runs share nothing.
    pub async fn run(&self, query: &str, max_iterations: u32) -> RunOutcome {
        info!(query = %query, max_iterations, "Workflow starting");
        let mut state = WorkflowState::new(query, max_iterations);
        let mut step = Step::Plan;

        loop {
            debug!(step = ?step, iteration = state.iteration, "Workflow step");
            step = match step {
                Step::Plan => {
                    self.plan_step(&mut state).await;
                    Step::Execute
                }
                Step::Execute => {
                    self.execute_step(&mut state).await;
                    Step::Reflect
                }
                Step::Reflect => {
                    self.reflect_step(&mut state).await;
                    Step::Decide
                }
                Step::Decide => self.decide_step(&mut state),
                Step::Refine => {
                    self.refine_step(&mut state);
                    Step::Execute
                }
                Step::Respond => {
                    state.final_response = synthesize(&state);
                    info!(
                        success = state.error_message.is_none(),
                        iterations = state.iteration,
                        "Workflow finished"
                    );
                    return RunOutcome::from(state);
                }
            };
        }
    }

    /// `plan`: query → initial task list. A planning failure is fatal but
    /// still transitions to execute, keeping the state shape consistent.
    async fn plan_step(&self, state: &mut WorkflowState) {
        match self.planner.generate_plan(&state.query).await {
            Ok(tasks) => {
                info!(tasks = tasks.len(), "Planning completed");
                state.tasks = tasks;
            }
            Err(e) => {
                error!(error = %e, "Planning failed");
                state.tasks.clear();
                state.results.clear();
                state.reflection = None;
                state.error_message = Some(format!("Critical error during task planning: {e}"));
            }
        }
    }

    /// `execute`: run every task in list order, one result per task.
    /// Failures are per-task, never fatal to the round.
    async fn execute_step(&self, state: &mut WorkflowState) {
        state.results.clear();
        if state.tasks.is_empty() {
            warn!("No tasks to execute, skipping execution step");
            return;
        }

        info!(tasks = state.tasks.len(), "Executing tasks");
        for i in 0..state.tasks.len() {
            let result = self.executor.execute_task(&state.tasks[i]).await;
            state.tasks[i].status = if result.status.is_completed() {
                TaskStatus::Completed
            } else {
                TaskStatus::Failed
            };
            state.results.push(result);
        }
    }

    /// `reflect`: judge the round. Bypassed with a synthetic failing verdict
    /// when a fatal error already exists or nothing was planned at all; a
    /// reflection infrastructure failure becomes fatal.
    async fn reflect_step(&self, state: &mut WorkflowState) {
        if let Some(error) = &state.error_message {
            warn!(error = %error, "Fatal error present, bypassing reflection");
            state.reflection = Some(Reflection::failure(error.clone()));
            return;
        }
        if state.results.is_empty() && state.tasks.is_empty() {
            warn!("Nothing was planned or executed, bypassing reflection");
            state.reflection = Some(Reflection::failure("No tasks were planned."));
            return;
        }

        match self
            .reflector
            .evaluate(&state.query, &state.tasks, &state.results)
            .await
        {
            Ok(verdict) => {
                info!(
                    success = verdict.success,
                    complete = verdict.complete,
                    refinements = verdict.refinements.len(),
                    "Reflection completed"
                );
                state.reflection = Some(verdict);
            }
            Err(e) => {
                error!(error = %e, "Reflection failed");
                let message = format!("Critical error during result reflection: {e}");
                state.reflection = Some(Reflection::failure(message.clone()));
                state.error_message = Some(message);
            }
        }
    }

    /// `decide`: increment the iteration counter and resolve to `refine` or
    /// `respond` by strict priority order.
    fn decide_step(&self, state: &mut WorkflowState) -> Step {
        state.iteration += 1;
        info!(
            iteration = state.iteration,
            max_iterations = state.max_iterations,
            "Deciding whether to continue"
        );

        // 1. A fatal error always ends the run.
        if state.error_message.is_some() {
            warn!("Fatal error present, ending workflow");
            return Step::Respond;
        }

        // 2. Iteration budget exhausted.
        if state.iteration >= state.max_iterations {
            info!("Max iterations reached, ending workflow");
            return Step::Respond;
        }

        let complete = state.reflection.as_ref().is_some_and(|r| r.complete);
        let success = state.reflection.as_ref().is_some_and(|r| r.success);

        // 3. The verdict says the query is satisfied.
        if complete && success {
            info!("Reflection reports completion and success, ending workflow");
            return Step::Respond;
        }

        // 4. Every result completed but the verdict withholds completion:
        //    end rather than refine forever on a judge that never concedes.
        let all_completed = state.results.iter().all(|r| r.status.is_completed());
        if all_completed && !complete {
            info!("All tasks successful but not marked complete, ending to prevent a loop");
            return Step::Respond;
        }

        // 5. There is something to refine and budget to do it.
        let has_refinements = state
            .reflection
            .as_ref()
            .is_some_and(|r| !r.refinements.is_empty());
        if has_refinements && state.iteration < state.max_iterations {
            info!("Refinements suggested and within iteration limit, continuing");
            return Step::Refine;
        }

        // 6. Nothing left to do.
        info!("No reason to continue, ending workflow");
        Step::Respond
    }

    /// `refine`: apply the verdict's instructions, then clear the stale
    /// results, verdict, and fatal-error flag — they no longer describe the
    /// task list.
    fn refine_step(&self, state: &mut WorkflowState) {
        let refinements = state
            .reflection
            .as_ref()
            .map(|r| r.refinements.clone())
            .unwrap_or_default();

        state.tasks = apply_refinements(std::mem::take(&mut state.tasks), &refinements);
        state.results.clear();
        state.reflection = None;
        state.error_message = None;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
