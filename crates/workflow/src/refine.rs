//! The refinement engine — applies add/modify/remove instructions to a task
//! list.
//!
//! Instructions are applied in the order given; later instructions see the
//! effect of earlier ones in the same round. Bad instructions are skipped
//! individually with a warning — the engine never raises and never aborts
//! the remaining instructions.

use serde_json::Value;
use taskweave_core::reflection::{Refinement, RefinementAction};
use taskweave_core::task::{Task, TaskId};
use tracing::{debug, info, warn};

/// Apply an ordered sequence of refinement instructions, producing the new
/// task list.
pub fn apply_refinements(mut tasks: Vec<Task>, refinements: &[Refinement]) -> Vec<Task> {
    if refinements.is_empty() {
        debug!("No refinement instructions, task list unchanged");
        return tasks;
    }

    let mut applied = 0usize;
    for refinement in refinements {
        match refinement.action {
            RefinementAction::Remove => {
                let Some(target) = &refinement.task_id else {
                    warn!("Remove refinement without a task_id, skipping");
                    continue;
                };
                let before = tasks.len();
                tasks.retain(|t| &t.id != target);
                if tasks.len() < before {
                    info!(task_id = %target, "Removed task");
                    applied += 1;
                } else {
                    warn!(task_id = %target, "No task matched remove instruction");
                }
            }
            RefinementAction::Modify => {
                let Some(target) = &refinement.task_id else {
                    warn!("Modify refinement without a task_id, skipping");
                    continue;
                };
                let Some(update) = decode_details(refinement.details.as_ref()) else {
                    warn!(task_id = %target, "Modify details are not a field map, skipping");
                    continue;
                };
                match tasks.iter_mut().find(|t| &t.id == target) {
                    Some(task) => {
                        let skipped = task.apply_update(&update);
                        if !skipped.is_empty() {
                            warn!(task_id = %target, fields = ?skipped, "Skipped re-typed field updates");
                        }
                        info!(task_id = %target, "Modified task");
                        applied += 1;
                    }
                    None => {
                        warn!(task_id = %target, "No task matched modify instruction");
                    }
                }
            }
            RefinementAction::Add => {
                let Some(mut details) = decode_details(refinement.details.as_ref()) else {
                    warn!("Add details are not a task map, skipping");
                    continue;
                };
                if details.get("id").is_none_or(Value::is_null) {
                    details.insert("id".into(), Value::from(next_integer_id(&tasks)));
                }
                match Task::from_raw_unchecked(&Value::Object(details)) {
                    Ok(task) => {
                        info!(task_id = %task.id, tool = %task.tool, "Added task");
                        tasks.push(task);
                        applied += 1;
                    }
                    Err(e) => {
                        warn!(error = %e, "Added task is incomplete, skipping");
                    }
                }
            }
            RefinementAction::Unknown => {
                warn!(refinement = ?refinement, "Unrecognized refinement action, skipping");
            }
        }
    }

    info!(applied, total = tasks.len(), "Refinement round complete");
    tasks
}

/// The next unused integer id: one greater than the maximum integer id
/// currently present (0 when none are).
fn next_integer_id(tasks: &[Task]) -> i64 {
    tasks
        .iter()
        .filter_map(|t| t.id.as_int())
        .max()
        .unwrap_or(0)
        + 1
}

/// Decode a refinement `details` payload into a field map.
///
/// Accepts either an inline JSON object or a JSON-encoded string containing
/// one; anything else is a decode failure.
fn decode_details(details: Option<&Value>) -> Option<serde_json::Map<String, Value>> {
    match details? {
        Value::Object(map) => Some(map.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_list() -> Vec<Task> {
        vec![
            Task::new(1, "search for Tokyo weather", "search"),
            Task::new(2, "72 - 32", "calculator"),
        ]
    }

    fn refinement(action: RefinementAction, task_id: Option<TaskId>, details: Option<Value>) -> Refinement {
        Refinement {
            action,
            task_id,
            details,
        }
    }

    #[test]
    fn empty_instructions_is_identity() {
        let tasks = task_list();
        let result = apply_refinements(tasks.clone(), &[]);
        assert_eq!(result, tasks);
    }

    #[test]
    fn remove_drops_matching_task() {
        let result = apply_refinements(
            task_list(),
            &[refinement(RefinementAction::Remove, Some(TaskId::Int(1)), Some(json!("redundant")))],
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, TaskId::Int(2));
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let tasks = task_list();
        let result = apply_refinements(
            tasks.clone(),
            &[refinement(RefinementAction::Remove, Some(TaskId::Int(99)), None)],
        );
        assert_eq!(result, tasks);
    }

    #[test]
    fn modify_merges_fields_into_first_match() {
        let result = apply_refinements(
            task_list(),
            &[refinement(
                RefinementAction::Modify,
                Some(TaskId::Int(1)),
                Some(json!({"description": "Tokyo average temperature in Celsius", "unit": "C"})),
            )],
        );
        assert_eq!(result[0].description, "Tokyo average temperature in Celsius");
        assert_eq!(result[0].extra["unit"], json!("C"));
        assert_eq!(result[1].description, "72 - 32");
    }

    #[test]
    fn modify_accepts_json_encoded_details() {
        let result = apply_refinements(
            task_list(),
            &[refinement(
                RefinementAction::Modify,
                Some(TaskId::Int(2)),
                Some(json!("{\"description\": \"(72 - 32) * 5 / 9\"}")),
            )],
        );
        assert_eq!(result[1].description, "(72 - 32) * 5 / 9");
    }

    #[test]
    fn modify_unknown_id_is_noop() {
        let tasks = task_list();
        let result = apply_refinements(
            tasks.clone(),
            &[refinement(
                RefinementAction::Modify,
                Some(TaskId::Int(99)),
                Some(json!({"description": "x"})),
            )],
        );
        assert_eq!(result, tasks);
    }

    #[test]
    fn modify_with_undecodable_details_skips_only_that_instruction() {
        let result = apply_refinements(
            task_list(),
            &[
                refinement(
                    RefinementAction::Modify,
                    Some(TaskId::Int(1)),
                    Some(json!("not json at all")),
                ),
                refinement(RefinementAction::Remove, Some(TaskId::Int(2)), None),
            ],
        );
        // First instruction dropped, second still applied.
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, TaskId::Int(1));
        assert_eq!(result[0].description, "search for Tokyo weather");
    }

    #[test]
    fn add_assigns_next_integer_id() {
        let result = apply_refinements(
            task_list(),
            &[refinement(
                RefinementAction::Add,
                None,
                Some(json!({"description": "convert to Celsius", "tool": "calculator"})),
            )],
        );
        assert_eq!(result.len(), 3);
        assert_eq!(result[2].id, TaskId::Int(3));
    }

    #[test]
    fn two_adds_never_collide() {
        let result = apply_refinements(
            task_list(),
            &[
                refinement(
                    RefinementAction::Add,
                    None,
                    Some(json!({"description": "a", "tool": "search"})),
                ),
                refinement(
                    RefinementAction::Add,
                    None,
                    Some(json!({"id": null, "description": "b", "tool": "search"})),
                ),
            ],
        );
        assert_eq!(result.len(), 4);
        assert_eq!(result[2].id, TaskId::Int(3));
        assert_eq!(result[3].id, TaskId::Int(4));
    }

    #[test]
    fn add_id_exceeds_every_existing_integer_id() {
        let mut tasks = task_list();
        tasks.push(Task::new(7, "later", "search"));
        tasks.push(Task::new("t-weird", "string id", "search"));
        let result = apply_refinements(
            tasks,
            &[refinement(
                RefinementAction::Add,
                None,
                Some(json!({"description": "c", "tool": "search"})),
            )],
        );
        assert_eq!(result.last().unwrap().id, TaskId::Int(8));
    }

    #[test]
    fn add_keeps_explicit_id() {
        let result = apply_refinements(
            task_list(),
            &[refinement(
                RefinementAction::Add,
                None,
                Some(json!({"id": 10, "description": "c", "tool": "search"})),
            )],
        );
        assert_eq!(result.last().unwrap().id, TaskId::Int(10));
    }

    #[test]
    fn add_missing_required_fields_is_skipped() {
        let tasks = task_list();
        let result = apply_refinements(
            tasks.clone(),
            &[refinement(
                RefinementAction::Add,
                None,
                Some(json!({"description": "no tool named"})),
            )],
        );
        assert_eq!(result, tasks);
    }

    #[test]
    fn unknown_action_is_skipped() {
        let tasks = task_list();
        let raw = json!({"action": "replace", "task_id": 1, "details": {"description": "x"}});
        let bad: Refinement = serde_json::from_value(raw).unwrap();
        let result = apply_refinements(tasks.clone(), &[bad]);
        assert_eq!(result, tasks);
    }

    #[test]
    fn later_instructions_see_earlier_effects() {
        let result = apply_refinements(
            task_list(),
            &[
                refinement(
                    RefinementAction::Add,
                    None,
                    Some(json!({"description": "added", "tool": "search"})),
                ),
                refinement(
                    RefinementAction::Modify,
                    Some(TaskId::Int(3)),
                    Some(json!({"description": "added then modified"})),
                ),
            ],
        );
        assert_eq!(result[2].description, "added then modified");
    }
}
