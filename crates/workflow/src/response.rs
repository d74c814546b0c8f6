//! Response synthesizer — renders the final human-readable text from the
//! last known results, reflection, or error.

use serde_json::Value;
use taskweave_core::result::TaskResult;

use crate::state::WorkflowState;

/// Longest rendered payload per result entry.
const MAX_PAYLOAD_CHARS: usize = 500;

/// Produce the final response text for a finished run.
pub fn synthesize(state: &WorkflowState) -> String {
    // A fatal error *is* the response.
    if let Some(error) = &state.error_message {
        return error.clone();
    }

    let successful: Vec<&TaskResult> = state
        .results
        .iter()
        .filter(|r| r.status.is_completed())
        .collect();
    let failed: Vec<&TaskResult> = state
        .results
        .iter()
        .filter(|r| !r.status.is_completed())
        .collect();

    let mut parts: Vec<String> = Vec::new();

    if !successful.is_empty() {
        parts.push("Successfully completed tasks yielded:".into());
        for (i, result) in successful.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, render_payload(&result.result)));
        }
    }

    if !failed.is_empty() {
        parts.push("\nSome tasks encountered issues:".into());
        for result in &failed {
            parts.push(format!(
                "Task {} failed: {}",
                result.task_id,
                render_payload(&result.result)
            ));
        }
    }

    if parts.is_empty() {
        let feedback = state
            .reflection
            .as_ref()
            .map(|r| r.feedback.clone())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| "Workflow concluded. No specific results to report.".into());
        parts.push(feedback);
        if state.tasks.is_empty() && state.results.is_empty() {
            parts.push("No tasks were planned or executed.".into());
        }
    }

    parts.join("\n").trim().to_string()
}

/// Render a result payload for display, truncated to a sane length.
fn render_payload(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_PAYLOAD_CHARS {
        text.chars().take(MAX_PAYLOAD_CHARS).collect()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskweave_core::reflection::Reflection;
    use taskweave_core::task::{Task, TaskId};

    fn state() -> WorkflowState {
        WorkflowState::new("q", 3)
    }

    #[test]
    fn fatal_error_is_the_response_verbatim() {
        let mut s = state();
        s.error_message = Some("Critical error during task planning: upstream down".into());
        s.results.push(TaskResult::completed(TaskId::Int(1), json!(4.0)));
        assert_eq!(
            synthesize(&s),
            "Critical error during task planning: upstream down"
        );
    }

    #[test]
    fn successful_results_enumerated() {
        let mut s = state();
        s.results.push(TaskResult::completed(TaskId::Int(1), json!(4.0)));
        s.results.push(TaskResult::completed(TaskId::Int(2), json!("sunny, 21C")));
        let response = synthesize(&s);
        assert!(response.contains("Successfully completed tasks yielded:"));
        assert!(response.contains("1. 4.0"));
        assert!(response.contains("2. sunny, 21C"));
    }

    #[test]
    fn failed_results_listed_with_ids() {
        let mut s = state();
        s.results.push(TaskResult::completed(TaskId::Int(1), json!(4.0)));
        s.results.push(TaskResult::failed(TaskId::Int(2), "retries exhausted"));
        s.results.push(TaskResult::failed_critically(TaskId::Text("t3".into()), "unknown tool"));
        let response = synthesize(&s);
        assert!(response.contains("Some tasks encountered issues:"));
        assert!(response.contains("Task 2 failed: retries exhausted"));
        assert!(response.contains("Task t3 failed: unknown tool"));
    }

    #[test]
    fn falls_back_to_reflection_feedback() {
        let mut s = state();
        s.tasks.push(Task::new(1, "x", "search"));
        s.reflection = Some(Reflection::failure("nothing worked this round"));
        assert_eq!(synthesize(&s), "nothing worked this round");
    }

    #[test]
    fn empty_run_reports_nothing_planned() {
        let mut s = state();
        s.reflection = Some(Reflection::failure("No tasks were planned."));
        let response = synthesize(&s);
        assert!(response.contains("No tasks were planned."));
        assert!(response.contains("No tasks were planned or executed."));
    }

    #[test]
    fn long_payloads_truncated() {
        let mut s = state();
        let long = "x".repeat(900);
        s.results.push(TaskResult::completed(TaskId::Int(1), json!(long)));
        let response = synthesize(&s);
        assert!(response.len() < 700);
    }
}
