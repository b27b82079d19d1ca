//! LLM integration for SQL generation: prompt construction and the provider client.

pub mod client;
pub mod error;
mod model;
pub mod prompt;
mod wire;

#[cfg(test)]
mod retry_tests;

pub use client::LlmClient;
pub use error::LlmError;
pub use model::TextModel;
pub use prompt::{FewShotExample, build_sql_prompt, unanswerable_reply};
