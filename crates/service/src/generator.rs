//! Turns a question into candidate SQL via the external model.

use std::sync::{Arc, LazyLock};

use mission_chat_core::constants::{MIN_QUERY_LEN, UNANSWERABLE_SENTINEL};
use mission_chat_core::{MISSIONS_SCHEMA, SchemaDescriptor};
use mission_chat_llm::client::truncate;
use mission_chat_llm::{TextModel, build_sql_prompt};
use regex::Regex;

use crate::connectivity::ConnectivityCheck;
use crate::error::PipelineError;

/// A reply wrapped in a Markdown code fence, with or without a language tag.
#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(?:[A-Za-z]+[ \t]*\r?\n|[ \t]*\r?\n?)(.*?)\s*```$").unwrap());

pub struct QueryGenerator {
    model: Arc<dyn TextModel>,
    connectivity: Arc<dyn ConnectivityCheck>,
    schema: &'static SchemaDescriptor,
}

impl QueryGenerator {
    #[must_use]
    pub fn new(model: Arc<dyn TextModel>, connectivity: Arc<dyn ConnectivityCheck>) -> Self {
        Self { model, connectivity, schema: &MISSIONS_SCHEMA }
    }

    #[must_use]
    pub const fn schema(&self) -> &'static SchemaDescriptor {
        self.schema
    }

    /// Candidate SQL for `question`. Only shape and sentinel checks are made
    /// here; safety is the validator's job.
    pub async fn generate(&self, question: &str) -> Result<String, PipelineError> {
        if !self.connectivity.is_reachable().await {
            return Err(PipelineError::NoConnectivity);
        }

        let prompt = build_sql_prompt(self.schema, question);
        tracing::debug!(prompt_len = prompt.len(), "built SQL prompt");
        tracing::info!("Sending question to model: '{}'", question);

        let raw = self.model.generate(&prompt).await.map_err(PipelineError::ModelUnavailable)?;
        let candidate = normalize_candidate(&raw);
        tracing::info!("Received SQL from model: '{}'", truncate(&candidate, 500));

        if candidate.chars().count() < MIN_QUERY_LEN {
            return Err(PipelineError::EmptyGeneration(candidate));
        }
        if candidate.starts_with(UNANSWERABLE_SENTINEL) {
            return Err(PipelineError::Unanswerable(candidate));
        }
        Ok(candidate)
    }
}

/// Trims, unwraps a code fence and drops one trailing `;`.
pub(crate) fn normalize_candidate(raw: &str) -> String {
    let trimmed = raw.trim();
    let unfenced = CODE_FENCE_REGEX
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |body| body.as_str().trim());
    unfenced.strip_suffix(';').unwrap_or(unfenced).trim_end().to_owned()
}
