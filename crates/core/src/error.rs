use thiserror::Error;

/// Startup configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{primary} (or {fallback}) environment variable must be set")]
    MissingApiKey { primary: &'static str, fallback: &'static str },

    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}
