//! Configuration loading for the Terraform Buildkite plugin.
//!
//! Buildkite hands every plugin its configuration through a single
//! environment variable (`BUILDKITE_PLUGINS`) holding a JSON array of
//! one-key objects. The key is the plugin reference
//! (`github.com/org/terraform-buildkite-plugin#v1.2.3`) and the value is
//! the plugin's own fragment. Loading proceeds in three steps:
//!
//! 1. Build a baseline document from recognised environment variables
//!    (currently the parallel job index and count).
//! 2. Merge the matched JSON fragment over that baseline, so JSON wins for
//!    every field it mentions and leaves the rest intact.
//! 3. Validate the merged document into a typed [`PluginConfig`].
//!
//! Environment access goes through [`EnvSource`] so tests can supply a
//! [`MapEnv`] instead of mutating the process environment.

mod env;
mod error;
mod loader;
mod logging;
mod merge;
mod model;
mod raw;
mod reference;
mod test_mode;
mod validate;

pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::ConfigError;
pub use loader::{ConfigLoader, LoaderOptions};
pub use logging::{LOG_FORMAT_ENV, LOG_LEVEL_ENV, LogFormat, LogFormatParseError, LogSettings};
pub use merge::merge_json;
pub use model::{
    AnnotationOutput, ComputedVar, DirectoriesSpec, InitOptions, Mode, OpaValidation,
    OutputSpec, Parallelism, PluginConfig, TerraformOptions, ValidationSpec, WorkingLocation,
    WorkingSpec,
};
pub use reference::{PluginEntry, find_plugin, parse_plugins, plugin_short_name};
pub use test_mode::{is_test_mode, test_mode_variable};

/// Name of the environment variable Buildkite uses for plugin payloads.
pub const DEFAULT_PLUGINS_ENV: &str = "BUILDKITE_PLUGINS";

/// Environment variable carrying the zero-based parallel job index.
pub const PARALLEL_JOB_ENV: &str = "BUILDKITE_PARALLEL_JOB";

/// Environment variable carrying the total number of parallel jobs.
pub const PARALLEL_JOB_COUNT_ENV: &str = "BUILDKITE_PARALLEL_JOB_COUNT";

#[cfg(test)]
mod tests;
