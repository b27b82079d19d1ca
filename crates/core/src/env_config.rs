//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Boolean flag accepting `1/0`, `true/false`, `yes/no`, `on/off` (any case).
pub fn env_flag(var: &str, default: bool) -> bool {
    let Ok(v) = std::env::var(var) else {
        return default;
    };
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!(var, value = %v, default, "invalid boolean env var, using default");
            default
        },
    }
}

/// Non-empty string value, or `None` when unset or blank.
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Comma-separated list; blank entries are dropped.
pub fn env_list(var: &str, default: &str) -> Vec<String> {
    let raw = env_non_empty(var).unwrap_or_else(|| default.to_owned());
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(ToOwned::to_owned).collect()
}
