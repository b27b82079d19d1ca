use std::time::Duration;

use async_trait::async_trait;
use mission_chat_core::LlmConfig;
use mission_chat_core::constants::{DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_MODEL};

use crate::error::LlmError;
use crate::model::TextModel;
use crate::wire::{CompletionRequest, CompletionResponse};

/// Backoff in seconds before the first, second and later retries.
const RETRY_DELAYS: [u64; 3] = [1, 2, 4];

/// Client for an OpenAI-compatible chat completions API.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) max_retries: usize,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl LlmClient {
    /// Creates a client with the default model, timeout and no retries.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        Self::build(
            api_key,
            &base_url,
            DEFAULT_MODEL.to_owned(),
            Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            0,
        )
    }

    /// Creates a client from the startup configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Self::build(
            config.api_key.clone(),
            &config.base_url,
            config.model.clone(),
            config.timeout,
            config.max_retries,
        )
    }

    fn build(
        api_key: String,
        base_url: &str,
        model: String,
        timeout: Duration,
        max_retries: usize,
    ) -> Result<Self, LlmError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key, base_url, model, max_retries })
    }

    /// Sets a custom model for this client.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Retries transient failures (429/5xx, transport errors) up to `max_retries` times.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Posts one completion request, retrying transient failures, and
    /// returns the first choice's text.
    pub(crate) async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let endpoint = format!("{}/chat/completions", self.base_url);
        let attempts = self.max_retries.saturating_add(1);
        let mut attempt: usize = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let err = match self.attempt(&endpoint, request).await {
                Ok(text) => return Ok(text),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => err,
            };

            if attempt >= attempts {
                if self.max_retries == 0 {
                    return Err(err);
                }
                return Err(LlmError::Exhausted { attempts, last: Box::new(err) });
            }

            let backoff = Duration::from_secs(RETRY_DELAYS.get(attempt.saturating_sub(1)).copied().unwrap_or(4));
            tracing::warn!(attempt, max_retries = self.max_retries, ?backoff, error = %err, "retrying model request");
            tokio::time::sleep(backoff).await;
        }
    }

    async fn attempt(&self, endpoint: &str, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let response = self.client.post(endpoint).bearer_auth(&self.api_key).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Status { code: status.as_u16(), body });
        }

        let decoded: CompletionResponse = serde_json::from_str(&body).map_err(|source| LlmError::Decode {
            context: format!("body: {}", truncate(&body, 200)),
            source,
        })?;
        let choice = decoded.choices.into_iter().next().ok_or(LlmError::NoChoices)?;
        if let Some(reason) = choice.finish_reason.as_deref().filter(|r| *r != "stop") {
            tracing::debug!(finish_reason = reason, "model stopped early");
        }
        choice.message.content.ok_or_else(|| LlmError::NoText {
            finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_owned()),
        })
    }
}

#[async_trait]
impl TextModel for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "sending prompt to model");
        self.complete(&CompletionRequest::single_prompt(&self.model, prompt)).await
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
