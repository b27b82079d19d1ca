//! Shared constants for mission-chat.

/// Prefix the model is told to emit when a question cannot be mapped to the schema.
pub const UNANSWERABLE_SENTINEL: &str = "ERROR:";

/// Trimmed model output shorter than this is not a plausible query.
pub const MIN_QUERY_LEN: usize = 5;

/// Default endpoint for the connectivity probe (public DNS).
pub const DEFAULT_PROBE_ADDR: &str = "8.8.8.8:53";

pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_DATABASE_PATH: &str = "missions.db";

/// OpenAI-compatible endpoint of the default provider.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Cookie carrying the opaque session identifier.
pub const SESSION_COOKIE_NAME: &str = "mission_chat_session";
