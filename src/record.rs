use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output categories intercepted independently.
///
/// Declaration order is the registration order: shims are installed and
/// channels are aggregated in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Log,
    Debug,
    Info,
    Warn,
    Error,
    Dir,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Log,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Dir,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Log => "log",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Dir => "dir",
        }
    }

    /// Whether the built-in handler for this severity writes to stderr.
    pub fn is_stderr(&self) -> bool {
        matches!(self, Severity::Warn | Severity::Error)
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How record timestamps are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// Milliseconds since the Unix epoch.
    #[default]
    EpochMillis,
    /// `YYYY-MM-DD HH:MM:SS.mmm` in UTC.
    Formatted,
}

/// Format string for [`TimestampMode::Formatted`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(i64),
    Formatted(String),
}

impl Timestamp {
    pub fn now(mode: TimestampMode) -> Self {
        Self::from_datetime(Utc::now(), mode)
    }

    pub fn from_datetime(at: DateTime<Utc>, mode: TimestampMode) -> Self {
        match mode {
            TimestampMode::EpochMillis => Timestamp::EpochMillis(at.timestamp_millis()),
            TimestampMode::Formatted => Timestamp::Formatted(at.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

/// One captured line of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub message: String,
    pub severity: Severity,
    pub timestamp: Timestamp,
}

impl Record {
    pub fn new(message: impl Into<String>, severity: Severity, mode: TimestampMode) -> Self {
        Self {
            message: message.into(),
            severity,
            timestamp: Timestamp::now(mode),
        }
    }
}
