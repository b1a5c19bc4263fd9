//! Errors raised while resolving working directories.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while resolving working directories.
#[derive(Debug, Clone, Error)]
pub enum WorkingDirError {
    /// Artifact-based discovery is not supported.
    #[error("artifact handling not implemented yet (artifact '{artifact}')")]
    NotImplemented {
        /// Configured artifact path.
        artifact: Utf8PathBuf,
    },

    /// The directory name filter does not compile.
    #[error("invalid directory name regex '{pattern}'")]
    InvalidRegex {
        /// Pattern as configured.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The parent directory could not be listed.
    #[error("failed to read directory '{path}'")]
    ReadDir {
        /// Directory being listed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}
