//! Environment variable names read when resolving [`crate::config::LoggerConfig`].
//!
//! Explicit options always take part in resolution; these only fill in or
//! (for `enabled`) veto.

/// Enables capture. `false`, `f` and `0` (any case) force capture off.
pub const LOGGER_ENABLED_ENV: &str = "INVOCATION_LOGGER_ENABLED";

/// `formatted` selects `YYYY-MM-DD HH:MM:SS.mmm` timestamps; anything else
/// keeps epoch milliseconds.
pub const LOGGER_TIMESTAMP_ENV: &str = "INVOCATION_LOGGER_TIMESTAMP";

/// Signer endpoint. When present the logger uploads its captured records.
pub const LOGGER_SIGNER_URL_ENV: &str = "INVOCATION_LOGGER_SIGNER_URL";

/// Path of the JSON artifact written by the local (non-upload) variant.
pub const LOGGER_OUTPUT_ENV: &str = "INVOCATION_LOGGER_OUTPUT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a non-empty environment variable.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
