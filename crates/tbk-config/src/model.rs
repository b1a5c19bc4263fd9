//! Validated configuration model.
//!
//! Everything here has passed semantic validation: paths that must exist did
//! exist at load time, regular expressions compile, and mutually exclusive
//! settings have been collapsed into enums.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Operation mode of the plugin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// Plan and validate only.
    Plan,
    /// Plan, validate and apply the reviewed plan.
    Apply,
}

/// Resolved configuration for one plugin invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginConfig {
    /// Operation mode.
    pub mode: Mode,
    /// Where the Terraform root modules live. `None` means there is nothing
    /// to process.
    pub working: Option<WorkingSpec>,
    /// Terraform execution options.
    pub terraform: Option<TerraformOptions>,
    /// Validation adapters, in evaluation order.
    pub validations: Vec<ValidationSpec>,
    /// Output adapters, in emission order.
    pub outputs: Vec<OutputSpec>,
}

/// Working directory selection plus optional sharding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingSpec {
    /// Single directory or a directory discovery rule.
    pub location: WorkingLocation,
    /// Parallel job shard assignment.
    pub parallelism: Option<Parallelism>,
}

/// Exactly one way of naming working directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingLocation {
    /// One directory.
    Directory(Utf8PathBuf),
    /// Several directories discovered at run time.
    Directories(DirectoriesSpec),
}

/// Discovery rule for multiple working directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoriesSpec {
    /// Immediate subdirectories of `path` whose names match `name_regex`.
    ParentDirectory {
        /// Directory whose children are candidates.
        path: Utf8PathBuf,
        /// Filter applied to each child's base name.
        name_regex: Option<String>,
    },
    /// Directories packaged in a build artifact.
    Artifact {
        /// Artifact file.
        path: Utf8PathBuf,
        /// Filter applied to each directory's base name.
        name_regex: Option<String>,
    },
}

/// Zero-based shard index and total shard count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Parallelism {
    /// Index of this job, always less than `parallel_job_count`.
    pub parallel_job: usize,
    /// Number of jobs sharing the directory list.
    pub parallel_job_count: usize,
}

/// Terraform execution options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TerraformOptions {
    /// Explicit path to the `terraform` executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_path: Option<Utf8PathBuf>,
    /// Options forwarded to `terraform init`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_options: Option<InitOptions>,
}

/// Options forwarded to `terraform init`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InitOptions {
    /// Directory holding pre-installed providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_dir: Option<Utf8PathBuf>,
    /// Whether `init` downloads modules (`-get`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_plugins: Option<bool>,
}

/// One configured validation adapter.
///
/// The single optional field is the adapter discriminant. Turning an entry
/// with no discriminant into a validator is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationSpec {
    /// Open Policy Agent validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opa: Option<OpaValidation>,
}

/// Open Policy Agent validation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OpaValidation {
    /// Bundle or policy path passed to `opa eval --data`.
    #[serde(default)]
    pub bundle: String,
    /// Query to evaluate, e.g. `data.terraform.deny`.
    #[serde(default)]
    pub query: String,
    /// Dotted path narrowing each query result to the violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// One configured output adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputSpec {
    /// Buildkite annotation output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildkite_annotation: Option<AnnotationOutput>,
}

/// Buildkite annotation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnnotationOutput {
    /// Path to the annotation template.
    #[serde(default)]
    pub template: String,
    /// Annotation context label.
    #[serde(default)]
    pub context: String,
    /// Static template variables, merged in order.
    #[serde(default)]
    pub vars: Vec<BTreeMap<String, String>>,
    /// Variables extracted from the plan document.
    #[serde(default)]
    pub computed_vars: Vec<ComputedVar>,
}

/// Template variable extracted from the plan document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ComputedVar {
    /// Variable name in the template.
    #[serde(default)]
    pub name: String,
    /// Dotted path into the plan JSON.
    #[serde(default)]
    pub from: String,
    /// Regular expression applied to the looked-up value.
    #[serde(default)]
    pub regex: String,
}
