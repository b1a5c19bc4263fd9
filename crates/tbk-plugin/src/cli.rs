//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use tbk_config::DEFAULT_PLUGINS_ENV;

use crate::metadata::PLUGIN_NAME;

/// Command-line interface of the plugin binary.
///
/// Buildkite runs the binary from the plugin's `command` hook without
/// arguments; the flags exist for local runs and tests.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "terraform-buildkite-plugin", version, about)]
pub struct Cli {
    /// Plugin name matched against the plugin references in the payload.
    #[arg(long, default_value = PLUGIN_NAME)]
    pub plugin_name: String,
    /// Environment variable holding the plugin payload.
    #[arg(long, default_value = DEFAULT_PLUGINS_ENV)]
    pub plugins_env: String,
    /// `terraform` executable used when the configuration names none.
    #[arg(long, value_name = "PATH")]
    pub terraform_path: Option<PathBuf>,
}
