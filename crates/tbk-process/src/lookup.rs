//! Executable discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ProcessError;

/// Finds the first executable called `name` on the search path.
///
/// # Errors
///
/// Returns [`ProcessError::NotFound`] when no match exists.
pub fn find_executable(name: &str) -> Result<PathBuf, ProcessError> {
    match which::which(name) {
        Ok(path) => {
            debug!(
                target: "tbk_process::lookup",
                name,
                path = %path.display(),
                "found executable on PATH"
            );
            Ok(path)
        }
        Err(err) => Err(ProcessError::NotFound {
            name: name.to_owned(),
            message: err.to_string(),
        }),
    }
}

/// Checks that an explicitly configured executable path is a file.
///
/// # Errors
///
/// Returns [`ProcessError::NotAFile`] when the path is missing or is not a
/// regular file.
pub fn require_file(path: &Path) -> Result<PathBuf, ProcessError> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(ProcessError::NotAFile {
            path: path.to_path_buf(),
        })
    }
}
