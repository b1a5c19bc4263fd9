//! Domain errors raised while launching subprocesses.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while preparing or running a subprocess.
///
/// A child that starts and exits with a non-zero status is not an error at
/// this layer; see [`crate::ProcessOutput::code`].
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that was launched.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Communicating with the running child failed.
    #[error("I/O error while running {program}: {source}")]
    Io {
        /// Program that was running.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The stdin pipe requested for the child was not available.
    #[error("stdin for {program} could not be captured")]
    StdinUnavailable {
        /// Program that was launched.
        program: PathBuf,
    },

    /// The helper thread feeding the child's stdin panicked.
    #[error("stdin writer for {program} terminated unexpectedly")]
    StdinWriter {
        /// Program that was launched.
        program: PathBuf,
    },

    /// The executable could not be located on the search path.
    #[error("executable '{name}' not found in PATH: {message}")]
    NotFound {
        /// Executable name that was searched for.
        name: String,
        /// Description of the lookup failure.
        message: String,
    },

    /// A configured executable path does not point at a file.
    #[error("executable path {path} is not a file")]
    NotAFile {
        /// Path that was checked.
        path: PathBuf,
    },
}
