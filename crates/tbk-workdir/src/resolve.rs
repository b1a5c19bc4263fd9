//! Working settings to directory list.

use camino::Utf8PathBuf;
use tbk_config::{DirectoriesSpec, WorkingLocation, WorkingSpec};
use tracing::{info, warn};

use crate::error::WorkingDirError;
use crate::list::list_dirs;
use crate::partition::partition;

const RESOLVE_TARGET: &str = "tbk_workdir::resolve";

/// Resolves the directories this job should process.
///
/// An absent `working` setting resolves to an empty list rather than an error.
/// When a parallelism assignment is present only this job's shard is
/// returned.
///
/// # Errors
///
/// Returns [`WorkingDirError::NotImplemented`] for artifact-based discovery
/// and propagates listing failures from [`list_dirs`].
pub fn resolve(spec: Option<&WorkingSpec>) -> Result<Vec<Utf8PathBuf>, WorkingDirError> {
    let Some(spec) = spec else {
        info!(target: RESOLVE_TARGET, "no working directory configuration");
        return Ok(Vec::new());
    };

    let directories = match &spec.location {
        WorkingLocation::Directory(directory) => vec![directory.clone()],
        WorkingLocation::Directories(DirectoriesSpec::ParentDirectory { path, name_regex }) => {
            list_dirs(path, name_regex.as_deref())?
        }
        WorkingLocation::Directories(DirectoriesSpec::Artifact { path, .. }) => {
            warn!(target: RESOLVE_TARGET, artifact = %path, "artifact handling not implemented yet");
            return Err(WorkingDirError::NotImplemented {
                artifact: path.clone(),
            });
        }
    };

    let Some(parallelism) = spec.parallelism else {
        info!(
            target: RESOLVE_TARGET,
            count = directories.len(),
            directories = ?directories,
            "resolved working directories"
        );
        return Ok(directories);
    };

    let shard = partition(
        &directories,
        parallelism.parallel_job,
        parallelism.parallel_job_count,
    )
    .to_vec();
    info!(
        target: RESOLVE_TARGET,
        parallel_job = parallelism.parallel_job,
        parallel_job_count = parallelism.parallel_job_count,
        selected = shard.len(),
        total = directories.len(),
        directories = ?shard,
        "resolved working directories for parallel job"
    );
    Ok(shard)
}
