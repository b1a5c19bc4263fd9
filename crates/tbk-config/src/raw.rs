//! Unvalidated serde shapes of the merged configuration document.

use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::model::{OutputSpec, TerraformOptions, ValidationSpec};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPlugin {
    #[serde(default)]
    pub(crate) mode: Option<String>,
    #[serde(default)]
    pub(crate) working: Option<RawWorking>,
    #[serde(default)]
    pub(crate) terraform: Option<TerraformOptions>,
    #[serde(default)]
    pub(crate) validations: Option<Vec<ValidationSpec>>,
    #[serde(default)]
    pub(crate) outputs: Option<Vec<OutputSpec>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawWorking {
    #[serde(default)]
    pub(crate) directory: Option<Utf8PathBuf>,
    #[serde(default)]
    pub(crate) directories: Option<RawDirectories>,
    #[serde(default)]
    pub(crate) parallelism: Option<RawParallelism>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDirectories {
    #[serde(default)]
    pub(crate) parent_directory: Option<Utf8PathBuf>,
    #[serde(default)]
    pub(crate) artifact: Option<Utf8PathBuf>,
    #[serde(default)]
    pub(crate) name_regex: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawParallelism {
    #[serde(default)]
    pub(crate) parallel_job: Option<i64>,
    #[serde(default)]
    pub(crate) parallel_job_count: Option<i64>,
}
