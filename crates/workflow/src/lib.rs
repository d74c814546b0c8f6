//! Plan→execute→reflect→refine iteration engine.
//!
//! The workflow decomposes a query into tool-backed tasks, executes them,
//! judges the round, and patches the task list until the query is satisfied
//! or the iteration budget runs out. This crate owns the state machine and
//! the continue/stop decision; everything LLM- or tool-shaped lives behind
//! the adapters in `taskweave-agents`.

pub mod engine;
pub mod refine;
pub mod response;
pub mod state;

pub use engine::Workflow;
pub use refine::apply_refinements;
pub use state::{RunOutcome, WorkflowState};
