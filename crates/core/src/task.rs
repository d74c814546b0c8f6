//! Task domain types — the unit of work the workflow plans and executes.
//!
//! Tasks arrive from an LLM-backed planner as loosely-structured JSON, so the
//! model is built for repair: the three required fields are typed, everything
//! else is preserved verbatim in an open extension map. `Task::from_raw` is
//! the single entry point that turns untrusted values into valid tasks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TaskValidationError;

/// A task identifier — integer or text.
///
/// Ids must be unique among tasks simultaneously present in one list; they
/// may be reused or regenerated across refinement rounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Int(i64),
    Text(String),
}

impl TaskId {
    /// The integer value, if this id is an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TaskId::Int(n) => Some(*n),
            TaskId::Text(_) => None,
        }
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskId::Int(n) => write!(f, "{n}"),
            TaskId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Int(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// One unit of work: a tool name and the text input to run it with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id within the current task list.
    pub id: TaskId,

    /// Free text, the sole input to the named tool.
    pub description: String,

    /// Name of the capability to invoke. Always a member of the registry's
    /// tool set once the task has passed validation.
    pub tool: String,

    /// Execution status.
    #[serde(default)]
    pub status: TaskStatus,

    /// How many times a refinement has re-armed this task.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub retry_count: u32,

    /// Unknown fields attached by the planner or by refinement instructions,
    /// preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

const REQUIRED_FIELDS: [&str; 3] = ["id", "description", "tool"];

impl Task {
    /// Create a task with the given required fields and no extras.
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            tool: tool.into(),
            status: TaskStatus::default(),
            retry_count: 0,
            extra: serde_json::Map::new(),
        }
    }

    /// Validate and repair an arbitrary JSON value into a task.
    ///
    /// This is a merge, not a strict schema match: the three required fields
    /// are copied when present and type-checked, remaining fields are copied
    /// verbatim into the extension map. Missing fields are never synthesized.
    pub fn from_raw(raw: &Value, allowed_tools: &[String]) -> Result<Self, TaskValidationError> {
        let task = Self::from_raw_unchecked(raw)?;
        if !allowed_tools.iter().any(|t| t == &task.tool) {
            return Err(TaskValidationError::UnknownTool {
                tool: task.tool,
                allowed: allowed_tools.to_vec(),
            });
        }
        Ok(task)
    }

    /// Validate and repair without checking tool membership.
    ///
    /// Used where the capability table is out of reach (the refinement
    /// engine); an unknown tool then surfaces at execution time as a
    /// critically-failed result instead.
    pub fn from_raw_unchecked(raw: &Value) -> Result<Self, TaskValidationError> {
        let map = raw.as_object().ok_or_else(|| TaskValidationError::NotAnObject {
            raw: raw.clone(),
        })?;

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|f| !map.contains_key(**f))
            .map(|f| f.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TaskValidationError::MissingFields {
                missing,
                raw: raw.clone(),
            });
        }

        let id = match &map["id"] {
            Value::Number(n) if n.as_i64().is_some() => TaskId::Int(n.as_i64().unwrap()),
            Value::String(s) => TaskId::Text(s.clone()),
            other => {
                return Err(TaskValidationError::WrongType {
                    field: "id".into(),
                    expected: "integer or string".into(),
                    raw: other.clone(),
                });
            }
        };

        let description = match &map["description"] {
            Value::String(s) => s.clone(),
            other => {
                return Err(TaskValidationError::WrongType {
                    field: "description".into(),
                    expected: "string".into(),
                    raw: other.clone(),
                });
            }
        };

        let tool = match &map["tool"] {
            Value::String(s) => s.clone(),
            other => {
                return Err(TaskValidationError::WrongType {
                    field: "tool".into(),
                    expected: "string".into(),
                    raw: other.clone(),
                });
            }
        };

        let mut task = Task::new(id, description, tool);

        // Copy remaining fields: recognized well-formed bookkeeping fields
        // become typed, everything else lands in the extension map verbatim.
        for (key, value) in map {
            match key.as_str() {
                "id" | "description" | "tool" => {}
                "status" => match serde_json::from_value::<TaskStatus>(value.clone()) {
                    Ok(status) => task.status = status,
                    Err(_) => {
                        task.extra.insert(key.clone(), value.clone());
                    }
                },
                "retry_count" => match value.as_u64() {
                    Some(n) => task.retry_count = n as u32,
                    None => {
                        task.extra.insert(key.clone(), value.clone());
                    }
                },
                _ => {
                    task.extra.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(task)
    }

    /// Merge a field-update map into this task, overwriting same-named
    /// fields and leaving others untouched.
    ///
    /// Updates that would re-type a required field are skipped so the task
    /// validity invariant survives the merge; the caller decides whether a
    /// skipped field is worth surfacing.
    pub fn apply_update(&mut self, update: &serde_json::Map<String, Value>) -> Vec<String> {
        let mut skipped = Vec::new();
        for (key, value) in update {
            match key.as_str() {
                "id" => match value {
                    Value::Number(n) if n.as_i64().is_some() => {
                        self.id = TaskId::Int(n.as_i64().unwrap());
                    }
                    Value::String(s) => self.id = TaskId::Text(s.clone()),
                    _ => skipped.push(key.clone()),
                },
                "description" => match value.as_str() {
                    Some(s) => self.description = s.to_string(),
                    None => skipped.push(key.clone()),
                },
                "tool" => match value.as_str() {
                    Some(s) => self.tool = s.to_string(),
                    None => skipped.push(key.clone()),
                },
                "status" => match serde_json::from_value::<TaskStatus>(value.clone()) {
                    Ok(status) => self.status = status,
                    Err(_) => skipped.push(key.clone()),
                },
                "retry_count" => match value.as_u64() {
                    Some(n) => self.retry_count = n as u32,
                    None => skipped.push(key.clone()),
                },
                _ => {
                    self.extra.insert(key.clone(), value.clone());
                }
            }
        }
        skipped
    }
}

/// Strip a calculator expression down to the evaluable character set:
/// digits, `+ - * / . ( )` and spaces. Anything else is removed.
///
/// An expression that comes back empty must be dropped by the caller — it
/// contained nothing evaluable.
pub fn sanitize_expression(expr: &str) -> String {
    expr.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '.' | '(' | ')' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn allowed() -> Vec<String> {
        vec!["search".into(), "calculator".into()]
    }

    #[test]
    fn from_raw_accepts_well_formed_task() {
        let raw = json!({"id": 1, "description": "2 + 2", "tool": "calculator"});
        let task = Task::from_raw(&raw, &allowed()).unwrap();
        assert_eq!(task.id, TaskId::Int(1));
        assert_eq!(task.description, "2 + 2");
        assert_eq!(task.tool, "calculator");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.extra.is_empty());
    }

    #[test]
    fn from_raw_accepts_string_id() {
        let raw = json!({"id": "t-1", "description": "x", "tool": "search"});
        let task = Task::from_raw(&raw, &allowed()).unwrap();
        assert_eq!(task.id, TaskId::Text("t-1".into()));
    }

    #[test]
    fn from_raw_preserves_unknown_fields() {
        let raw = json!({
            "id": 2,
            "description": "find it",
            "tool": "search",
            "priority": "high",
            "source": {"kind": "reflector"}
        });
        let task = Task::from_raw(&raw, &allowed()).unwrap();
        assert_eq!(task.extra["priority"], json!("high"));
        assert_eq!(task.extra["source"]["kind"], json!("reflector"));
    }

    #[test]
    fn from_raw_rejects_non_object() {
        let err = Task::from_raw(&json!("not a task"), &allowed()).unwrap_err();
        assert!(matches!(err, TaskValidationError::NotAnObject { .. }));
    }

    #[test]
    fn from_raw_rejects_missing_fields() {
        let err = Task::from_raw(&json!({"id": 1}), &allowed()).unwrap_err();
        match err {
            TaskValidationError::MissingFields { missing, .. } => {
                assert_eq!(missing, vec!["description".to_string(), "tool".to_string()]);
            }
            other => panic!("Expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn from_raw_rejects_bad_id_type() {
        let raw = json!({"id": 1.5, "description": "x", "tool": "search"});
        let err = Task::from_raw(&raw, &allowed()).unwrap_err();
        assert!(matches!(err, TaskValidationError::WrongType { ref field, .. } if field == "id"));
    }

    #[test]
    fn from_raw_rejects_unknown_tool() {
        let raw = json!({"id": 1, "description": "rm -rf /", "tool": "shell"});
        let err = Task::from_raw(&raw, &allowed()).unwrap_err();
        assert!(matches!(err, TaskValidationError::UnknownTool { ref tool, .. } if tool == "shell"));
    }

    #[test]
    fn from_raw_unchecked_skips_tool_membership() {
        let raw = json!({"id": 1, "description": "x", "tool": "teleport"});
        let task = Task::from_raw_unchecked(&raw).unwrap();
        assert_eq!(task.tool, "teleport");
    }

    #[test]
    fn from_raw_recognizes_status_and_retry_count() {
        let raw = json!({
            "id": 1, "description": "x", "tool": "search",
            "status": "failed", "retry_count": 2
        });
        let task = Task::from_raw(&raw, &allowed()).unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_eq!(task.retry_count, 2);
        assert!(task.extra.is_empty());
    }

    #[test]
    fn from_raw_keeps_malformed_status_as_extra() {
        let raw = json!({"id": 1, "description": "x", "tool": "search", "status": "on-hold"});
        let task = Task::from_raw(&raw, &allowed()).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.extra["status"], json!("on-hold"));
    }

    #[test]
    fn apply_update_overwrites_and_extends() {
        let mut task = Task::new(1, "old", "search");
        let update = json!({"description": "new", "note": "retry with quotes"});
        let skipped = task.apply_update(update.as_object().unwrap());
        assert!(skipped.is_empty());
        assert_eq!(task.description, "new");
        assert_eq!(task.extra["note"], json!("retry with quotes"));
    }

    #[test]
    fn apply_update_skips_retyped_required_field() {
        let mut task = Task::new(1, "keep me", "search");
        let update = json!({"description": 42});
        let skipped = task.apply_update(update.as_object().unwrap());
        assert_eq!(skipped, vec!["description".to_string()]);
        assert_eq!(task.description, "keep me");
    }

    #[test]
    fn serde_round_trip_keeps_extras_flat() {
        let raw = json!({"id": 1, "description": "x", "tool": "search", "hint": "news"});
        let task = Task::from_raw(&raw, &allowed()).unwrap();
        let serialized = serde_json::to_value(&task).unwrap();
        assert_eq!(serialized["hint"], json!("news"));
        assert_eq!(serialized["id"], json!(1));
    }

    #[test]
    fn sanitize_keeps_arithmetic_only() {
        assert_eq!(sanitize_expression("2 + import os"), "2 +");
        assert_eq!(sanitize_expression("(3.5 * 2) - 1"), "(3.5 * 2) - 1");
        assert_eq!(sanitize_expression("import os"), "");
        assert_eq!(sanitize_expression("  2+2  "), "2+2");
    }
}
