//! Reflection verdict types — the reflector's judgment of one round.
//!
//! A verdict decodes strictly: all four fields must be present, and
//! `refinements` must be a list. An unrecognized refinement action decodes
//! to [`RefinementAction::Unknown`] instead of failing the whole verdict —
//! bad instructions are skipped at application time, a bad verdict shape is
//! a hard failure at decode time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::TaskId;

/// The reflector's structured judgment for one execute→reflect round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    /// Did the executed tasks, taken together, make correct progress.
    pub success: bool,

    /// Does this satisfy the original query. Independent of `success`: a
    /// round can be successful but incomplete.
    pub complete: bool,

    /// Free text explaining the verdict.
    pub feedback: String,

    /// Ordered task mutations to apply before the next round.
    pub refinements: Vec<Refinement>,
}

impl Reflection {
    /// A synthetic failing verdict with no refinements, used when the
    /// reflector is bypassed (fatal error, or nothing was executed).
    pub fn failure(feedback: impl Into<String>) -> Self {
        Self {
            success: false,
            complete: false,
            feedback: feedback.into(),
            refinements: Vec::new(),
        }
    }
}

/// One requested task-list mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    /// What to do. Unrecognized values decode to `Unknown`.
    pub action: RefinementAction,

    /// Target task id for modify/remove; `None` for add.
    #[serde(default)]
    pub task_id: Option<TaskId>,

    /// For add/modify: a full new task or a partial field-update, either as
    /// an inline object or a JSON-encoded string. For remove: free-text
    /// rationale.
    #[serde(default)]
    pub details: Option<Value>,
}

/// The kind of mutation a refinement requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefinementAction {
    Add,
    Modify,
    Remove,
    /// Anything the reflector produced that we do not recognize.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verdict_decodes_with_all_fields() {
        let raw = json!({
            "success": true,
            "complete": false,
            "feedback": "one task remains",
            "refinements": [
                {"action": "add", "task_id": null, "details": "{\"id\": 2, \"description\": \"2*3\", \"tool\": \"calculator\"}"}
            ]
        });
        let verdict: Reflection = serde_json::from_value(raw).unwrap();
        assert!(verdict.success);
        assert!(!verdict.complete);
        assert_eq!(verdict.refinements.len(), 1);
        assert_eq!(verdict.refinements[0].action, RefinementAction::Add);
        assert_eq!(verdict.refinements[0].task_id, None);
    }

    #[test]
    fn verdict_missing_field_fails_decode() {
        let raw = json!({"success": true, "feedback": "", "refinements": []});
        assert!(serde_json::from_value::<Reflection>(raw).is_err());
    }

    #[test]
    fn unrecognized_action_decodes_to_unknown() {
        let raw = json!({"action": "replace", "task_id": 1, "details": "{}"});
        let refinement: Refinement = serde_json::from_value(raw).unwrap();
        assert_eq!(refinement.action, RefinementAction::Unknown);
    }

    #[test]
    fn remove_rationale_is_plain_text() {
        let raw = json!({"action": "remove", "task_id": 2, "details": "failed repeatedly"});
        let refinement: Refinement = serde_json::from_value(raw).unwrap();
        assert_eq!(refinement.action, RefinementAction::Remove);
        assert_eq!(refinement.details, Some(json!("failed repeatedly")));
    }

    #[test]
    fn synthetic_failure_has_empty_refinements() {
        let verdict = Reflection::failure("planner produced nothing");
        assert!(!verdict.success);
        assert!(!verdict.complete);
        assert!(verdict.refinements.is_empty());
    }
}
