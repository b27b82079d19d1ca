use async_trait::async_trait;

use crate::error::LlmError;

/// Opaque text-in/text-out language model.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Returns the raw completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
