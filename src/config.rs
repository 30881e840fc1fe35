use crate::env::{env_opt, env_or, LOGGER_ENABLED_ENV, LOGGER_OUTPUT_ENV, LOGGER_SIGNER_URL_ENV, LOGGER_TIMESTAMP_ENV};
use crate::record::TimestampMode;
use std::path::PathBuf;

/// Options passed by the host when constructing the logger.
///
/// Every field is optional; [`LoggerConfig::resolve`] merges them with the
/// environment.
#[derive(Clone, Debug, Default)]
pub struct LoggerOptions {
    pub enabled: Option<bool>,
    pub timestamp_mode: Option<TimestampMode>,
    pub signer_url: Option<String>,
    pub output_path: Option<PathBuf>,
}

/// Effective logger configuration.
///
/// **Fields**
/// - `enabled`: whether console output is captured at all.
/// - `timestamp_mode`: rendering of record timestamps.
/// - `signer_url`: signer endpoint; selects the upload variant.
/// - `output_path`: JSON artifact written by the local variant, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggerConfig {
    pub enabled: bool,
    pub timestamp_mode: TimestampMode,
    pub signer_url: Option<String>,
    pub output_path: Option<PathBuf>,
}

impl LoggerConfig {
    /// Merge `options` with the process environment.
    pub fn resolve(options: LoggerOptions) -> Self {
        let env_enabled = env_or(LOGGER_ENABLED_ENV, "");
        let timestamp_mode = options
            .timestamp_mode
            .unwrap_or_else(|| parse_timestamp_mode(&env_or(LOGGER_TIMESTAMP_ENV, "")));

        Self {
            enabled: resolve_enabled(options.enabled, &env_enabled),
            timestamp_mode,
            signer_url: options.signer_url.or_else(|| env_opt(LOGGER_SIGNER_URL_ENV)),
            output_path: options.output_path.or_else(|| env_opt(LOGGER_OUTPUT_ENV).map(PathBuf::from)),
        }
    }
}

/// Whether an environment value is one of the recognized falsey literals.
pub fn is_falsey(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "false" | "f" | "0")
}

/// Combine the constructor option with the environment value.
///
/// A falsey environment value always wins. Otherwise a truthy option or any
/// non-empty environment value enables capture.
pub fn resolve_enabled(option: Option<bool>, env_value: &str) -> bool {
    if is_falsey(env_value) {
        return false;
    }
    option.unwrap_or(false) || !env_value.is_empty()
}

fn parse_timestamp_mode(value: &str) -> TimestampMode {
    if value.eq_ignore_ascii_case("formatted") {
        TimestampMode::Formatted
    } else {
        TimestampMode::EpochMillis
    }
}
