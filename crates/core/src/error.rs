//! Error types for the Taskweave domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Taskweave operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Planning errors ---
    #[error("Planning error: {0}")]
    Planning(#[from] PlanningError),

    // --- Reflection errors ---
    #[error("Reflection error: {0}")]
    Reflection(#[from] ReflectionError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Empty response from provider")]
    EmptyResponse,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures while turning a query into a task list.
///
/// Any of these is fatal for the round: without a usable plan there is
/// nothing to execute or refine.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("Empty response from planner")]
    EmptyResponse,

    #[error("Planner output is not valid JSON: {reason}")]
    Decode { reason: String },

    #[error("Expected a JSON array of tasks, got {found}")]
    NotAList { found: String },

    #[error("No valid tasks derived from planner output ({candidates} candidate items)")]
    NoValidTasks { candidates: usize },

    #[error("Planner provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Failures while judging a round's results.
///
/// A malformed verdict cannot safely drive the continuation decision, so
/// these are hard failures rather than defaulted verdicts.
#[derive(Debug, Error)]
pub enum ReflectionError {
    #[error("Empty response from reflector")]
    EmptyResponse,

    #[error("Reflector output is not valid JSON: {reason}")]
    Decode { reason: String },

    #[error("Reflection verdict missing required fields: {missing:?}")]
    MissingFields { missing: Vec<String> },

    #[error("Reflection 'refinements' field must be a list")]
    RefinementsNotAList,

    #[error("Reflector provider failed: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

/// Rejection of a raw task-like value during validation and repair.
///
/// Carries enough of the offending input for diagnostics; one invalid task
/// never aborts the batch it arrived in.
#[derive(Debug, Error)]
pub enum TaskValidationError {
    #[error("Task item is not an object: {raw}")]
    NotAnObject { raw: serde_json::Value },

    #[error("Task missing required fields {missing:?}: {raw}")]
    MissingFields {
        missing: Vec<String>,
        raw: serde_json::Value,
    },

    #[error("Task field '{field}' has the wrong type (expected {expected}): {raw}")]
    WrongType {
        field: String,
        expected: String,
        raw: serde_json::Value,
    },

    #[error("Task specifies an unknown tool '{tool}' (allowed: {allowed:?})")]
    UnknownTool { tool: String, allowed: Vec<String> },

    #[error("Calculator expression empty after sanitization: {original}")]
    EmptyExpression { original: String },
}
