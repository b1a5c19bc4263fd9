//! Log output settings read from the environment.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::env::EnvSource;

/// Environment variable holding the log filter expression.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_LOG_FILTER: &str = "info";

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable single line output, rendered well by the Buildkite log
    /// viewer.
    #[default]
    Compact,
    /// Structured JSON suitable for ingestion by logging stacks.
    Json,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Filter and format requested for the plugin's diagnostic output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    filter: String,
    format: LogFormat,
    rejected_format: Option<String>,
}

impl LogSettings {
    /// Reads `LOG_LEVEL` and `LOG_FORMAT` from `env`.
    ///
    /// Unset or blank values fall back to the `info` filter and the compact
    /// format. An unrecognised format is remembered so the caller can warn
    /// about it once logging is running.
    #[must_use]
    pub fn from_env(env: &impl EnvSource) -> Self {
        let filter = env
            .var(LOG_LEVEL_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        let raw_format = env
            .var(LOG_FORMAT_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let (format, rejected_format) = match raw_format {
            None => (LogFormat::default(), None),
            Some(value) => match value.parse::<LogFormat>() {
                Ok(format) => (format, None),
                Err(_) => (LogFormat::default(), Some(value)),
            },
        };

        Self {
            filter,
            format,
            rejected_format,
        }
    }

    /// Filter expression in `tracing-subscriber` `EnvFilter` syntax.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Default filter used when the configured one is rejected.
    #[must_use]
    pub const fn default_filter() -> &'static str {
        DEFAULT_LOG_FILTER
    }

    /// Selected output format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }

    /// The `LOG_FORMAT` value that could not be parsed, if any.
    #[must_use]
    pub fn rejected_format(&self) -> Option<&str> {
        self.rejected_format.as_deref()
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_owned(),
            format: LogFormat::default(),
            rejected_format: None,
        }
    }
}
