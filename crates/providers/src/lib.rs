//! LLM provider implementations for Taskweave.
//!
//! The planner and reflector adapters only need plain chat completions, so
//! a single OpenAI-compatible client covers Groq, OpenAI, OpenRouter,
//! Ollama, and anything else exposing `/v1/chat/completions`. The scripted
//! mock backs adapter and engine tests.

pub mod mock;
pub mod openai_compat;

pub use mock::ScriptedProvider;
pub use openai_compat::OpenAiCompatProvider;
