//! Typed errors for the service layer.
//!
//! `PipelineError` is the per-request taxonomy: every variant is recovered at
//! the chat handler boundary and rendered as a bot message. `ServiceError` is
//! what service operations themselves return to callers.

use mission_chat_core::SchemaDescriptor;
use mission_chat_llm::LlmError;
use mission_chat_storage::StorageError;
use thiserror::Error;

/// Discriminant of [`PipelineError`], for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoConnectivity,
    ModelUnavailable,
    EmptyGeneration,
    Unanswerable,
    UnsafeQuery,
    ExecutionError,
    Unexpected,
}

/// Failure of one stage of the question-to-results pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The connectivity probe failed; the model was not called.
    #[error("no internet connection available")]
    NoConnectivity,

    #[error("model call failed: {0}")]
    ModelUnavailable(#[source] LlmError),

    /// Model output too short to be a plausible query.
    #[error("invalid SQL generated by model: {0:?}")]
    EmptyGeneration(String),

    /// The model answered with the unanswerable sentinel.
    #[error("model could not answer: {0}")]
    Unanswerable(String),

    #[error("potentially unsafe SQL blocked ({violation}): {sql}")]
    UnsafeQuery { sql: String, violation: String },

    /// The engine rejected the query, timed out or could not open the dataset.
    #[error("query execution failed: {0}")]
    ExecutionError(#[source] StorageError),

    #[error("unexpected failure: {0}")]
    Unexpected(#[source] anyhow::Error),
}

impl PipelineError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoConnectivity => ErrorKind::NoConnectivity,
            Self::ModelUnavailable(_) => ErrorKind::ModelUnavailable,
            Self::EmptyGeneration(_) => ErrorKind::EmptyGeneration,
            Self::Unanswerable(_) => ErrorKind::Unanswerable,
            Self::UnsafeQuery { .. } => ErrorKind::UnsafeQuery,
            Self::ExecutionError(_) => ErrorKind::ExecutionError,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Engine failures are reported to the user; anything else is a server fault.
    #[must_use]
    pub fn from_storage(err: StorageError) -> Self {
        if err.is_engine_error() {
            Self::ExecutionError(err)
        } else {
            Self::Unexpected(err.into())
        }
    }

    /// Bot message shown for this failure. Only `ExecutionError` carries
    /// detail; `Unexpected` detail stays in the logs.
    #[must_use]
    pub fn user_message(&self, schema: &SchemaDescriptor) -> String {
        match self {
            Self::NoConnectivity => "You are not connected to the internet right now. \
                Please connect to the internet to proceed."
                .to_owned(),
            Self::ModelUnavailable(_) | Self::EmptyGeneration(_) => {
                "Sorry, I encountered an issue generating or validating the SQL for your question."
                    .to_owned()
            },
            Self::Unanswerable(_) => format!(
                "Sorry, I cannot answer this question with the available data using SQL. \
                 Please ask about {}.",
                schema.readable_field_list()
            ),
            Self::UnsafeQuery { .. } => {
                "Sorry, the generated SQL query was potentially unsafe and was blocked.".to_owned()
            },
            Self::ExecutionError(e) => format!(
                "Sorry, there was a problem querying the database. \
                 The generated query might be invalid. (Details: {e})"
            ),
            Self::Unexpected(_) => {
                "An unexpected server error occurred while processing your SQL request.".to_owned()
            },
        }
    }
}

/// Service-layer error returned by [`crate::ChatService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Reading or clearing session history failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller provided invalid input (empty message).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ServiceError {
    /// Whether the caller, not the server, is at fault.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
