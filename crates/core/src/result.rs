//! Execution result types — the outcome of running one task.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::TaskId;

/// Outcome status of one task execution.
///
/// `FailedCritically` marks structural failures (unknown tool, invalid task
/// shape) as opposed to ordinary dispatch failures; everything outside
/// display must treat both the same way, via [`ResultStatus::is_completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Completed,
    Failed,
    FailedCritically,
}

impl ResultStatus {
    /// Whether this status counts as a successful completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, ResultStatus::Completed)
    }
}

/// The recorded outcome of executing one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Id of the originating task.
    pub task_id: TaskId,

    /// Tool payload on success (text, number, or structured value), or a
    /// human-readable error string on failure.
    pub result: Value,

    /// Outcome status.
    pub status: ResultStatus,
}

impl TaskResult {
    /// A successful result carrying the tool's payload.
    pub fn completed(task_id: TaskId, payload: Value) -> Self {
        Self {
            task_id,
            result: payload,
            status: ResultStatus::Completed,
        }
    }

    /// An ordinary failure (dispatch error, retries exhausted).
    pub fn failed(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            result: Value::String(message.into()),
            status: ResultStatus::Failed,
        }
    }

    /// A structural failure detected before dispatch.
    pub fn failed_critically(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            result: Value::String(message.into()),
            status: ResultStatus::FailedCritically,
        }
    }
}
