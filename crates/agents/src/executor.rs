//! Tool execution adapter — one task in, exactly one result out.
//!
//! No failure mode escapes this boundary: pre-dispatch validation problems
//! become critically-failed results, dispatch errors are retried with
//! exponential backoff and become ordinary failed results on exhaustion.

use std::sync::Arc;
use std::time::Duration;

use taskweave_core::result::TaskResult;
use taskweave_core::task::Task;
use taskweave_tools::ToolRegistry;
use tracing::{debug, info, warn};

/// How many dispatch attempts a task gets in total.
const MAX_ATTEMPTS: u32 = 3;

/// First retry delay; doubles per attempt up to [`MAX_BACKOFF`].
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Executes single tasks against the capability table.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            max_attempts: MAX_ATTEMPTS,
            base_backoff: BASE_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, max_attempts: u32, base: Duration, cap: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_backoff = base;
        self.max_backoff = cap;
        self
    }

    /// The names of the capabilities this executor can dispatch to.
    pub fn tool_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Execute one task, producing exactly one result.
    pub async fn execute_task(&self, task: &Task) -> TaskResult {
        // Pre-dispatch validation: no retry for structural problems.
        if task.tool.is_empty() {
            warn!(task_id = %task.id, "Task has an empty tool field");
            return TaskResult::failed_critically(task.id.clone(), "Task missing tool field");
        }
        if self.registry.get(&task.tool).is_none() {
            warn!(task_id = %task.id, tool = %task.tool, "Task names an unknown tool");
            return TaskResult::failed_critically(
                task.id.clone(),
                format!("Unknown tool: {}", task.tool),
            );
        }

        debug!(task_id = %task.id, tool = %task.tool, "Dispatching task");

        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self.registry.invoke(&task.tool, &task.description).await {
                Ok(payload) => {
                    info!(task_id = %task.id, tool = %task.tool, attempt, "Task completed");
                    return TaskResult::completed(task.id.clone(), payload);
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(
                        task_id = %task.id,
                        tool = %task.tool,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %last_error,
                        "Task dispatch failed"
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff_delay(attempt)).await;
                    }
                }
            }
        }

        TaskResult::failed(
            task.id.clone(),
            format!(
                "Task {} (tool: {}) failed after {} attempts: {}",
                task.id, task.tool, self.max_attempts, last_error
            ),
        )
    }

    /// Delay before the attempt following `attempt` (1-based): doubles from
    /// the base, capped.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt - 1).min(8);
        (self.base_backoff * factor).min(self.max_backoff)
    }
}
