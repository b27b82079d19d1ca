//! Failures talking to the completion provider.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection, TLS or timeout failure before a status line arrived.
    #[error("provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider answered HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("undecodable completion ({context}): {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("completion contained no choices")]
    NoChoices,
    /// A choice came back with `content: null`, usually a refusal or tool call.
    #[error("completion choice carried no text (finish_reason: {finish_reason})")]
    NoText { finish_reason: String },
    #[error("could not build HTTP client: {0}")]
    ClientInit(String),
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: usize, last: Box<LlmError> },
}

impl LlmError {
    /// Rate limits, overloads, gateway errors and transport failures are worth another attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_builder() && !e.is_decode(),
            Self::Status { code, .. } => matches!(code, 408 | 429 | 500 | 502 | 503 | 504 | 529),
            Self::Exhausted { .. }
            | Self::Decode { .. }
            | Self::NoChoices
            | Self::NoText { .. }
            | Self::ClientInit(_) => false,
        }
    }
}
