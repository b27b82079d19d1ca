//! Request and response bodies of the `/chat/completions` endpoint.
//!
//! Only the fields the SQL generator reads are modelled; everything else in
//! the provider payload is ignored on decode.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PromptRole {
    User,
}

#[derive(Serialize)]
pub(crate) struct PromptMessage<'a> {
    pub role: PromptRole,
    pub content: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: [PromptMessage<'a>; 1],
    pub temperature: f32,
}

impl<'a> CompletionRequest<'a> {
    /// Single-turn request sampled at temperature zero.
    pub(crate) const fn single_prompt(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: [PromptMessage { role: PromptRole::User, content: prompt }],
            temperature: 0.0,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
pub(crate) struct CompletionChoice {
    pub message: AssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}
