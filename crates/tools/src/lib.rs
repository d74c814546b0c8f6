//! Built-in tool capabilities for Taskweave.
//!
//! A tool is an external action invocable by name from a task: it takes the
//! task's description as its sole text input and returns a JSON payload.
//! The registry is the capability table the executor dispatches against.

pub mod calculator;
pub mod search;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use taskweave_core::error::ToolError;

pub use calculator::CalculatorTool;
pub use search::SearchTool;

/// The core Tool trait.
///
/// Each capability (search, calculator) implements this trait. Tools are
/// registered in the [`ToolRegistry`] and invoked by the execution adapter.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "search", "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// Invoke the tool with the given text input.
    async fn invoke(&self, input: &str) -> std::result::Result<Value, ToolError>;
}

/// A registry of available tools, keyed by name.
///
/// The execution adapter uses this to look up and dispatch capabilities;
/// the planner uses the name list to validate task `tool` fields.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Invoke the named tool with the given input.
    pub async fn invoke(&self, name: &str, input: &str) -> std::result::Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.invoke(input).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the default registry: text search and arithmetic evaluation.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchTool::offline()));
    registry.register(Box::new(CalculatorTool));
    registry
}
