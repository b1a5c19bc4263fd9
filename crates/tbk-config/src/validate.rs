//! Semantic validation of the merged configuration.

use std::str::FromStr;

use camino::Utf8Path;
use regex::Regex;

use crate::error::ConfigError;
use crate::model::{
    DirectoriesSpec, Mode, OutputSpec, Parallelism, PluginConfig, TerraformOptions,
    ValidationSpec, WorkingLocation, WorkingSpec,
};
use crate::raw::{RawDirectories, RawParallelism, RawPlugin, RawWorking};

/// Validates `raw` into a [`PluginConfig`].
///
/// `working_from_fragment` records whether the plugin fragment itself
/// supplied a `working` object. A `working` object that only carries
/// environment-derived parallelism names no directories and is dropped.
pub(crate) fn validate(
    raw: RawPlugin,
    working_from_fragment: bool,
) -> Result<PluginConfig, ConfigError> {
    let mode = validate_mode(raw.mode.as_deref())?;
    let working = match raw.working {
        Some(working) => validate_working(working, working_from_fragment)?,
        None => None,
    };
    let terraform = raw.terraform.map(validate_terraform).transpose()?;
    let validations = raw.validations.unwrap_or_default();
    validate_validations(&validations)?;
    let outputs = raw.outputs.unwrap_or_default();
    validate_outputs(&outputs)?;

    Ok(PluginConfig {
        mode,
        working,
        terraform,
        validations,
        outputs,
    })
}

fn validate_mode(mode: Option<&str>) -> Result<Mode, ConfigError> {
    let mode = mode
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ConfigError::invalid("mode is required"))?;
    Mode::from_str(mode)
        .map_err(|_| ConfigError::invalid(format!("mode '{mode}' must be one of plan, apply")))
}

fn validate_working(
    working: RawWorking,
    from_fragment: bool,
) -> Result<Option<WorkingSpec>, ConfigError> {
    let directory = working.directory.filter(|dir| !dir.as_str().is_empty());
    let location = match (directory, working.directories) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::invalid(
                "working.directory and working.directories are mutually exclusive",
            ));
        }
        (Some(directory), None) => {
            require_dir(&directory, "working.directory")?;
            WorkingLocation::Directory(directory)
        }
        (None, Some(directories)) => WorkingLocation::Directories(validate_directories(directories)?),
        (None, None) if from_fragment => {
            return Err(ConfigError::invalid(
                "working requires one of directory or directories",
            ));
        }
        (None, None) => return Ok(None),
    };

    let parallelism = working
        .parallelism
        .map(validate_parallelism)
        .transpose()?
        .flatten();

    Ok(Some(WorkingSpec {
        location,
        parallelism,
    }))
}

fn validate_directories(directories: RawDirectories) -> Result<DirectoriesSpec, ConfigError> {
    let parent = directories
        .parent_directory
        .filter(|dir| !dir.as_str().is_empty());
    let artifact = directories.artifact.filter(|file| !file.as_str().is_empty());
    let name_regex = directories.name_regex.filter(|regex| !regex.is_empty());
    if let Some(pattern) = &name_regex {
        compile(pattern, "working.directories.name_regex")?;
    }

    match (parent, artifact) {
        (Some(_), Some(_)) => Err(ConfigError::invalid(
            "working.directories.parent_directory and working.directories.artifact are mutually exclusive",
        )),
        (Some(path), None) => {
            require_dir(&path, "working.directories.parent_directory")?;
            Ok(DirectoriesSpec::ParentDirectory { path, name_regex })
        }
        (None, Some(path)) => {
            require_file(&path, "working.directories.artifact")?;
            Ok(DirectoriesSpec::Artifact { path, name_regex })
        }
        (None, None) => Err(ConfigError::invalid(
            "working.directories requires one of parent_directory or artifact",
        )),
    }
}

fn validate_parallelism(raw: RawParallelism) -> Result<Option<Parallelism>, ConfigError> {
    match (raw.parallel_job, raw.parallel_job_count) {
        (None, None) => Ok(None),
        (Some(_), None) | (None, Some(_)) => Err(ConfigError::invalid(
            "parallel_job and parallel_job_count must be set together",
        )),
        (Some(job), Some(count)) => {
            let parallel_job = usize::try_from(job).map_err(|_| {
                ConfigError::invalid(format!("parallel_job {job} must not be negative"))
            })?;
            let parallel_job_count = usize::try_from(count).map_err(|_| {
                ConfigError::invalid(format!("parallel_job_count {count} must not be negative"))
            })?;
            if parallel_job >= parallel_job_count {
                return Err(ConfigError::invalid(format!(
                    "parallel_job {parallel_job} must be less than parallel_job_count {parallel_job_count}"
                )));
            }
            Ok(Some(Parallelism {
                parallel_job,
                parallel_job_count,
            }))
        }
    }
}

fn validate_terraform(options: TerraformOptions) -> Result<TerraformOptions, ConfigError> {
    if let Some(path) = &options.exec_path {
        require_file(path, "terraform.exec_path")?;
    }
    if let Some(dir) = options
        .init_options
        .as_ref()
        .and_then(|init| init.plugin_dir.as_ref())
    {
        require_dir(dir, "terraform.init_options.plugin_dir")?;
    }
    Ok(options)
}

fn validate_validations(validations: &[ValidationSpec]) -> Result<(), ConfigError> {
    for (index, opa) in validations
        .iter()
        .enumerate()
        .filter_map(|(index, spec)| spec.opa.as_ref().map(|opa| (index, opa)))
    {
        if opa.bundle.is_empty() {
            return Err(ConfigError::invalid(format!(
                "validations[{index}].opa.bundle is required"
            )));
        }
        if opa.query.is_empty() {
            return Err(ConfigError::invalid(format!(
                "validations[{index}].opa.query is required"
            )));
        }
    }
    Ok(())
}

fn validate_outputs(outputs: &[OutputSpec]) -> Result<(), ConfigError> {
    for (index, annotation) in outputs
        .iter()
        .enumerate()
        .filter_map(|(index, spec)| spec.buildkite_annotation.as_ref().map(|a| (index, a)))
    {
        let field = format!("outputs[{index}].buildkite_annotation");
        if annotation.template.is_empty() {
            return Err(ConfigError::invalid(format!("{field}.template is required")));
        }
        for (var_index, var) in annotation.computed_vars.iter().enumerate() {
            let var_field = format!("{field}.computed_vars[{var_index}]");
            if var.name.is_empty() || var.from.is_empty() || var.regex.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "{var_field} requires name, from and regex"
                )));
            }
            compile(&var.regex, &format!("{var_field}.regex"))?;
        }
    }
    Ok(())
}

fn compile(pattern: &str, field: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|err| ConfigError::invalid(format!("{field} is not a valid regex: {err}")))
}

fn require_dir(path: &Utf8Path, field: &str) -> Result<(), ConfigError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::invalid(format!(
            "{field} '{path}' is not an existing directory"
        )))
    }
}

fn require_file(path: &Utf8Path, field: &str) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::invalid(format!(
            "{field} '{path}' is not an existing file"
        )))
    }
}
