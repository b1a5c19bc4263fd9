//! Locating the `terraform` executable.

use std::path::{Path, PathBuf};

use tbk_process::{find_executable, require_file};
use tracing::debug;

use crate::error::TerraformError;

/// Picks the `terraform` executable to run.
///
/// Order of preference: the configured path, then the command-line
/// override, then the first `terraform` on `PATH`. The check runs once, when
/// the orchestrator is built.
///
/// # Errors
///
/// Returns [`TerraformError::NotFound`] when the chosen explicit path is not
/// a file, or when no explicit path was given and `PATH` has no `terraform`.
pub fn resolve_exec_path(
    configured: Option<&Path>,
    override_path: Option<&Path>,
) -> Result<PathBuf, TerraformError> {
    let not_found = |source: tbk_process::ProcessError| TerraformError::NotFound {
        message: source.to_string(),
        source,
    };

    if let Some(path) = configured.or(override_path) {
        debug!(target: "tbk_terraform::exec_path", path = %path.display(), "using explicit terraform path");
        return require_file(path).map_err(not_found);
    }

    debug!(
        target: "tbk_terraform::exec_path",
        "terraform exec path not configured, searching PATH"
    );
    find_executable("terraform").map_err(not_found)
}
