//! Configuration errors.
//!
//! The `Display` text of each variant is deliberately stable so operators can
//! grep for it. Library detail travels as the error source and is logged
//! separately.

use std::num::ParseIntError;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while loading plugin configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The plugin payload variable is unset.
    #[error("failed to parse plugin configuration")]
    MissingPayload {
        /// Name of the environment variable that was read.
        variable: String,
    },

    /// The payload, the matched fragment, or the merged document is not
    /// valid for the expected shape.
    #[error("failed to parse plugin configuration")]
    Parse {
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The matched fragment is neither an object nor `null`.
    #[error("failed to parse plugin configuration")]
    FragmentNotObject {
        /// Plugin reference whose fragment was rejected.
        reference: String,
    },

    /// No payload entry matches the requested plugin name.
    #[error("could not initialize plugin")]
    PluginNotFound {
        /// Plugin name that was searched for.
        plugin: String,
    },

    /// An environment variable could not be coerced to its field type.
    #[error("failed to parse environment variables")]
    Environment {
        /// Name of the offending variable.
        variable: String,
        /// Raw value that failed to parse.
        value: String,
        /// Underlying integer parse error.
        #[source]
        source: ParseIntError,
    },

    /// The merged configuration violates a semantic constraint.
    #[error("failed to validate config: {constraint}")]
    Validation {
        /// Human-readable description of the violated constraint.
        constraint: String,
    },
}

impl ConfigError {
    pub(crate) fn parse(source: serde_json::Error) -> Self {
        Self::Parse {
            source: Arc::new(source),
        }
    }

    pub(crate) fn invalid(constraint: impl Into<String>) -> Self {
        Self::Validation {
            constraint: constraint.into(),
        }
    }
}
