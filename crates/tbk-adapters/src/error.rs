//! Adapter errors.

use std::sync::Arc;

use tbk_buildkite::AgentError;
use tbk_process::ProcessError;
use thiserror::Error;

/// Errors raised while building adapters from configuration.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// A validation entry names no known validator.
    #[error("unknown validation type at validations[{index}]")]
    UnknownValidation {
        /// Position in the configured list.
        index: usize,
    },

    /// An output entry names no known outputer.
    #[error("unknown output type at outputs[{index}]")]
    UnknownOutput {
        /// Position in the configured list.
        index: usize,
    },

    /// A computed variable's regular expression does not compile.
    #[error("computed variable '{name}' has an invalid regex")]
    InvalidComputedVar {
        /// Variable name.
        name: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while evaluating a policy.
#[derive(Debug, Clone, Error)]
pub enum PolicyError {
    /// The plan could not be serialised as policy input.
    #[error("failed to serialise policy input")]
    Input {
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The policy engine could not be run.
    #[error("failed to run policy engine for query '{query}'")]
    Process {
        /// Query being evaluated.
        query: String,
        /// Underlying process error.
        #[source]
        source: ProcessError,
    },

    /// The policy engine reported an evaluation failure.
    #[error("failed to evaluate query '{query}' (status {status}): {stderr}")]
    Evaluation {
        /// Query being evaluated.
        query: String,
        /// Exit status, or `signal` when the process was killed.
        status: String,
        /// Trimmed standard error.
        stderr: String,
    },

    /// The policy engine printed something other than its JSON result set.
    #[error("policy engine returned invalid JSON for query '{query}'")]
    InvalidOutput {
        /// Query being evaluated.
        query: String,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },
}

/// Errors raised while emitting an output.
#[derive(Debug, Clone, Error)]
pub enum OutputError {
    /// The Buildkite agent rejected the annotation.
    #[error("failed to create Buildkite annotation")]
    Annotation {
        /// Underlying agent error.
        #[source]
        source: AgentError,
    },
}
