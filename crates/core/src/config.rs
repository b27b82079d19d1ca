//! Runtime configuration, built once at startup and passed to components.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_CORS_ORIGIN, DEFAULT_DATABASE_PATH, DEFAULT_LLM_TIMEOUT_SECS,
    DEFAULT_MODEL, DEFAULT_PROBE_ADDR, DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_QUERY_TIMEOUT_SECS,
};
use crate::env_config::{env_flag, env_list, env_non_empty, env_parse_with_default};
use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "MISSION_CHAT_API_KEY";
pub const API_KEY_FALLBACK_VAR: &str = "GOOGLE_API_KEY";

/// Model provider settings.
#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: usize,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    /// SQLite file holding the `MISSIONS` table.
    pub database_path: PathBuf,
    /// Persist chat history here; in-memory when `None`.
    pub session_db_path: Option<PathBuf>,
    pub probe_addr: String,
    pub probe_timeout: Duration,
    pub skip_connectivity_check: bool,
    pub query_timeout: Duration,
    pub record_user_turns: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Defaults for everything except the credential.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            llm: LlmConfig {
                api_key: api_key.into(),
                base_url: DEFAULT_API_URL.to_owned(),
                model: DEFAULT_MODEL.to_owned(),
                timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
                max_retries: 0,
            },
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            session_db_path: None,
            probe_addr: DEFAULT_PROBE_ADDR.to_owned(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            skip_connectivity_check: false,
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            record_user_turns: true,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_owned()],
        }
    }

    /// Reads the full configuration from the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingApiKey`] when no credential is set, or
    /// [`ConfigError::InvalidValue`] for a zero timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = api_key_from_env()?;
        let mut config = Self::new(api_key);

        if let Some(url) = env_non_empty("MISSION_CHAT_API_URL") {
            config.llm.base_url = url;
        }
        if let Some(model) = env_non_empty("MISSION_CHAT_MODEL") {
            config.llm.model = model;
        }
        config.llm.timeout = secs_from_env("MISSION_CHAT_LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?;
        config.llm.max_retries = env_parse_with_default("MISSION_CHAT_LLM_MAX_RETRIES", 0);

        config.database_path = database_path_from_env();
        config.session_db_path = env_non_empty("MISSION_CHAT_SESSION_DB").map(PathBuf::from);

        if let Some(addr) = env_non_empty("MISSION_CHAT_PROBE_ADDR") {
            config.probe_addr = addr;
        }
        config.probe_timeout =
            secs_from_env("MISSION_CHAT_PROBE_TIMEOUT_SECS", DEFAULT_PROBE_TIMEOUT_SECS)?;
        config.skip_connectivity_check = env_flag("MISSION_CHAT_SKIP_CONNECTIVITY", false);
        config.query_timeout =
            secs_from_env("MISSION_CHAT_QUERY_TIMEOUT_SECS", DEFAULT_QUERY_TIMEOUT_SECS)?;
        config.record_user_turns = env_flag("MISSION_CHAT_RECORD_USER_TURNS", true);
        config.cors_origins = env_list("MISSION_CHAT_CORS_ORIGINS", DEFAULT_CORS_ORIGIN);

        Ok(config)
    }
}

/// Dataset path on its own, for commands that never call the model.
#[must_use]
pub fn database_path_from_env() -> PathBuf {
    env_non_empty("MISSION_CHAT_DB").map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from)
}

fn api_key_from_env() -> Result<String, ConfigError> {
    env_non_empty(API_KEY_VAR)
        .or_else(|| env_non_empty(API_KEY_FALLBACK_VAR))
        .ok_or(ConfigError::MissingApiKey { primary: API_KEY_VAR, fallback: API_KEY_FALLBACK_VAR })
}

fn secs_from_env(var: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let secs = env_parse_with_default(var, default);
    if secs == 0 {
        return Err(ConfigError::InvalidValue { var, reason: "timeout must be positive".to_owned() });
    }
    Ok(Duration::from_secs(secs))
}
