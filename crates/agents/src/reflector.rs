//! Reflector adapter — judges a round's results against the original query.
//!
//! Stateless: the verdict derives solely from (query, tasks, results). A
//! malformed verdict is a hard failure for the round — it cannot safely
//! drive the continuation decision, so nothing is silently defaulted.

use std::sync::Arc;

use taskweave_core::error::ReflectionError;
use taskweave_core::provider::{ChatMessage, ChatRequest, Provider};
use taskweave_core::reflection::Reflection;
use taskweave_core::result::TaskResult;
use taskweave_core::task::Task;
use tracing::{debug, info};

const REFLECT_PROMPT: &str = r#"You are a reflection agent. Evaluate whether the executed tasks satisfy the original query and suggest refinements if they do not.

Judge:
1. success — did the executed tasks, taken together, make correct progress (check the status fields).
2. complete — is the original query fully addressed. A round can be successful but incomplete.
3. If not complete, suggest task refinements: modify or remove existing tasks by id, or add new ones.

Return ONLY a JSON object:
{
    "success": true/false,
    "complete": true/false,
    "feedback": "what the results show and what is still missing",
    "refinements": [
        {"action": "modify/add/remove", "task_id": <id or null>, "details": <new or changed task fields as a JSON object, or the reason for removal>}
    ]
}

An added task needs "description" and "tool" fields; leave its "id" null to have one assigned.
If everything succeeded and the query is answered, set success and complete to true with empty refinements."#;

/// LLM-backed reflector.
pub struct Reflector {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

const REQUIRED_FIELDS: [&str; 4] = ["success", "complete", "feedback", "refinements"];

impl Reflector {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Produce a reflection verdict for one round.
    pub async fn evaluate(
        &self,
        query: &str,
        tasks: &[Task],
        results: &[TaskResult],
    ) -> Result<Reflection, ReflectionError> {
        info!(tasks = tasks.len(), results = results.len(), "Evaluating round");

        let context = format!(
            "Original query: {}\n\nExecuted tasks:\n{}\n\nTask results:\n{}",
            query,
            serde_json::to_string_pretty(tasks).map_err(|e| ReflectionError::Decode {
                reason: format!("Failed to encode tasks: {e}"),
            })?,
            serde_json::to_string_pretty(results).map_err(|e| ReflectionError::Decode {
                reason: format!("Failed to encode results: {e}"),
            })?,
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(REFLECT_PROMPT), ChatMessage::user(context)],
            temperature: self.temperature,
            max_tokens: None,
        };

        let response = self.provider.complete(request).await?;
        let content = response.content.trim();
        if content.is_empty() {
            return Err(ReflectionError::EmptyResponse);
        }

        let parsed = crate::decode::extract_json(content)
            .map_err(|reason| ReflectionError::Decode { reason })?;

        let object = parsed.as_object().ok_or_else(|| ReflectionError::Decode {
            reason: "verdict is not a JSON object".into(),
        })?;

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|f| !object.contains_key(**f))
            .map(|f| f.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ReflectionError::MissingFields { missing });
        }
        if !object["refinements"].is_array() {
            return Err(ReflectionError::RefinementsNotAList);
        }

        let verdict: Reflection =
            serde_json::from_value(parsed).map_err(|e| ReflectionError::Decode {
                reason: e.to_string(),
            })?;

        debug!(
            success = verdict.success,
            complete = verdict.complete,
            refinements = verdict.refinements.len(),
            "Reflection complete"
        );
        Ok(verdict)
    }
}
