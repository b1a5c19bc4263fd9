//! Subdirectory discovery.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tracing::debug;

use crate::error::WorkingDirError;

const LIST_TARGET: &str = "tbk_workdir::list";

/// Lists the immediate subdirectories of `parent` whose base name matches
/// `name_regex`, sorted by name.
///
/// Entries that are not directories are skipped, as are directories whose
/// name is not valid UTF-8. An absent pattern accepts every subdirectory.
/// Symlinks to directories count as directories.
///
/// # Errors
///
/// Returns [`WorkingDirError::InvalidRegex`] when the pattern does not
/// compile and [`WorkingDirError::ReadDir`] when `parent` cannot be listed.
pub fn list_dirs(
    parent: &Utf8Path,
    name_regex: Option<&str>,
) -> Result<Vec<Utf8PathBuf>, WorkingDirError> {
    let regex = name_regex
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| WorkingDirError::InvalidRegex {
                pattern: pattern.to_owned(),
                source,
            })
        })
        .transpose()?;

    let read_error = |source: std::io::Error| WorkingDirError::ReadDir {
        path: parent.to_path_buf(),
        source: Arc::new(source),
    };

    let mut dirs = Vec::new();
    let mut skipped_files = 0_usize;
    let mut filtered = 0_usize;
    for entry in std::fs::read_dir(parent).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if !entry.path().is_dir() {
            skipped_files += 1;
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            debug!(
                target: LIST_TARGET,
                name = ?entry.file_name(),
                "directory name is not valid UTF-8, skipping"
            );
            filtered += 1;
            continue;
        };
        if regex.as_ref().is_some_and(|regex| !regex.is_match(&name)) {
            debug!(target: LIST_TARGET, name, "directory name does not match regex, skipping");
            filtered += 1;
            continue;
        }
        dirs.push(parent.join(name));
    }
    dirs.sort();

    debug!(
        target: LIST_TARGET,
        path = %parent,
        found = dirs.len(),
        skipped_files,
        filtered,
        "completed directory listing"
    );
    Ok(dirs)
}
