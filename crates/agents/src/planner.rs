//! Planner adapter — turns a query into an initial task list.
//!
//! The upstream model returns a loosely-structured JSON array of task-like
//! items; each item is repaired and validated into the canonical task shape.
//! Invalid items are skipped individually. Planning as a whole fails only
//! when the provider is unreachable, the output is undecodable, or candidate
//! items existed but none survived validation — presenting zero tasks when
//! candidates existed indicates structural output corruption rather than a
//! legitimately empty plan.

use std::sync::Arc;

use taskweave_core::error::{PlanningError, TaskValidationError};
use taskweave_core::provider::{ChatMessage, ChatRequest, Provider};
use taskweave_core::task::{sanitize_expression, Task};
use tracing::{debug, info, warn};

const PLAN_PROMPT: &str = r#"You are a planning agent. Decompose the user's query into a JSON array of tasks.

Rules:
1. Each task has exactly these fields:
   - "id": a number (1, 2, 3, ...)
   - "description": the text input for the tool (search terms, or an arithmetic expression)
   - "tool": the name of one available tool
2. Only the listed tools may be used. Use "search" for all information gathering.
3. Use "calculator" only for arithmetic; its description must contain only digits, + - * / . ( ) and spaces.
4. Return ONLY the JSON array, no prose.

Available tools:
{tools}

Examples:
Query: "calculate 2+2"
[{"id": 1, "description": "2+2", "tool": "calculator"}]

Query: "what is today's weather in Tokyo"
[{"id": 1, "description": "current weather in Tokyo", "tool": "search"}]"#;

/// LLM-backed planner.
pub struct Planner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    allowed_tools: Vec<String>,
}

impl Planner {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, allowed_tools: Vec<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            allowed_tools,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate a validated task list for the query.
    pub async fn generate_plan(&self, query: &str) -> Result<Vec<Task>, PlanningError> {
        info!(query = %query, "Generating plan");

        let tool_list: String = self
            .allowed_tools
            .iter()
            .map(|t| format!("- {t}"))
            .collect::<Vec<_>>()
            .join("\n");

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(PLAN_PROMPT.replace("{tools}", &tool_list)),
                ChatMessage::user(query),
            ],
            temperature: self.temperature,
            max_tokens: None,
        };

        let response = self.provider.complete(request).await?;
        let content = response.content.trim();
        if content.is_empty() {
            return Err(PlanningError::EmptyResponse);
        }

        let parsed = crate::decode::extract_json(content)
            .map_err(|reason| PlanningError::Decode { reason })?;

        let items = match parsed {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(PlanningError::NotAList {
                    found: json_type_name(&other).to_string(),
                });
            }
        };

        debug!(candidates = items.len(), "Parsed planner output");

        let mut tasks = Vec::new();
        for item in &items {
            match Task::from_raw(item, &self.allowed_tools) {
                Ok(mut task) => {
                    if task.tool == "calculator" {
                        let cleaned = sanitize_expression(&task.description);
                        if cleaned.is_empty() {
                            let err = TaskValidationError::EmptyExpression {
                                original: task.description.clone(),
                            };
                            warn!(task_id = %task.id, error = %err, "Dropping calculator task");
                            continue;
                        }
                        task.description = cleaned;
                    }
                    tasks.push(task);
                }
                Err(e) => {
                    warn!(error = %e, "Skipping invalid task item");
                }
            }
        }

        if tasks.is_empty() && !items.is_empty() {
            return Err(PlanningError::NoValidTasks {
                candidates: items.len(),
            });
        }

        info!(tasks = tasks.len(), "Plan generated");
        Ok(tasks)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
