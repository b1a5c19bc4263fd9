//! Errors raised by the Buildkite agent adapter.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tbk_process::ProcessError;
use thiserror::Error;

/// Errors raised by the Buildkite agent adapter.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// `buildkite-agent` could not be run.
    #[error("failed to run buildkite-agent {subcommand}")]
    Process {
        /// Agent subcommand.
        subcommand: &'static str,
        /// Underlying process error.
        #[source]
        source: ProcessError,
    },

    /// `buildkite-agent` exited with a failure status.
    #[error("command `buildkite-agent {subcommand}` failed with status {status}: {stderr}")]
    CommandFailed {
        /// Agent subcommand.
        subcommand: &'static str,
        /// Exit status, or `signal` when the process was killed.
        status: String,
        /// Trimmed standard error.
        stderr: String,
    },

    /// The annotation template could not be read.
    #[error("failed to read template '{}'", path.display())]
    TemplateRead {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The annotation template could not be rendered.
    #[error("failed to render template '{}'", path.display())]
    TemplateRender {
        /// Template path.
        path: PathBuf,
        /// Underlying rendering error.
        #[source]
        source: Arc<handlebars::RenderError>,
    },
}
