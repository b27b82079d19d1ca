//! Request handler: runs one chat message through the pipeline and records
//! the exchange in the caller's session.

mod gates;

use std::fmt;
use std::sync::Arc;

use mission_chat_core::{ChatTurn, ResultSet, SchemaDescriptor};
use mission_chat_storage::{QueryExecutor, SessionStore};

use crate::error::{PipelineError, ServiceError};
use crate::generator::QueryGenerator;
use crate::validator::{SafetyValidator, ValidatedQuery};
use gates::SessionGates;

/// Pipeline stage, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Generating,
    Validating,
    Executing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generating => "generating",
            Self::Validating => "validating",
            Self::Executing => "executing",
        })
    }
}

pub struct ChatService {
    generator: QueryGenerator,
    validator: SafetyValidator,
    executor: Arc<dyn QueryExecutor>,
    sessions: Arc<dyn SessionStore>,
    gates: SessionGates,
    record_user_turns: bool,
}

impl ChatService {
    #[must_use]
    pub fn new(
        generator: QueryGenerator,
        executor: Arc<dyn QueryExecutor>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let validator = SafetyValidator::new(generator.schema());
        Self {
            generator,
            validator,
            executor,
            sessions,
            gates: SessionGates::default(),
            record_user_turns: true,
        }
    }

    /// When disabled only bot turns are appended to history.
    #[must_use]
    pub const fn with_record_user_turns(mut self, record: bool) -> Self {
        self.record_user_turns = record;
        self
    }

    #[must_use]
    pub const fn schema(&self) -> &'static SchemaDescriptor {
        self.generator.schema()
    }

    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatTurn>, ServiceError> {
        Ok(self.sessions.get(session_id).await?)
    }

    /// Answers `message` with exactly one bot turn. Pipeline failures become
    /// the bot turn's content; only an empty message is an error.
    pub async fn handle_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatTurn, ServiceError> {
        if message.is_empty() {
            return Err(ServiceError::InvalidInput("message must not be empty".to_owned()));
        }
        let question = message;

        let _gate = self.gates.acquire(session_id).await;
        tracing::info!(session_id, "Received user message: '{}'", question);

        let reply = match self.run_pipeline(question).await {
            Ok(turn) => turn,
            Err(err) => ChatTurn::bot(err.user_message(self.schema())),
        };

        let mut turns = Vec::with_capacity(2);
        if self.record_user_turns {
            turns.push(ChatTurn::user(question));
        }
        turns.push(reply.clone());
        if let Err(e) = self.sessions.append_all(session_id, turns).await {
            tracing::error!(session_id, error = %e, "Failed to record chat turns");
        }

        Ok(reply)
    }

    /// Resets the session's history. Returns how many turns were removed.
    pub async fn clear(&self, session_id: &str) -> Result<usize, ServiceError> {
        let _gate = self.gates.acquire(session_id).await;
        let cleared = self.sessions.clear(session_id).await?;
        if cleared == 0 {
            tracing::info!(session_id, "No chat history found in session to clear.");
        } else {
            tracing::info!(session_id, cleared, "Chat history cleared for session.");
        }
        Ok(cleared)
    }

    async fn run_pipeline(&self, question: &str) -> Result<ChatTurn, PipelineError> {
        tracing::debug!(stage = %Stage::Generating, "pipeline stage");
        let candidate = self.generator.generate(question).await.map_err(failed(Stage::Generating))?;

        tracing::debug!(stage = %Stage::Validating, "pipeline stage");
        let query = self.validator.validate(&candidate).map_err(failed(Stage::Validating))?;

        tracing::debug!(stage = %Stage::Executing, "pipeline stage");
        let results = self.execute(&query).await.map_err(failed(Stage::Executing))?;

        tracing::info!(
            "Successfully processed SQL-related message, returning {} results.",
            results.row_count()
        );
        Ok(ChatTurn::bot_with_results(format!("Generated SQL:\n```sql\n{query}\n```"), results))
    }

    async fn execute(&self, query: &ValidatedQuery) -> Result<ResultSet, PipelineError> {
        self.executor.execute(query.as_str()).await.map_err(PipelineError::from_storage)
    }
}

fn failed(stage: Stage) -> impl FnOnce(PipelineError) -> PipelineError {
    move |err| {
        match &err {
            PipelineError::Unexpected(_) => {
                tracing::error!(%stage, kind = ?err.kind(), error = ?err, "pipeline failed");
            },
            _ => tracing::error!(%stage, kind = ?err.kind(), error = %err, "pipeline failed"),
        }
        err
    }
}
