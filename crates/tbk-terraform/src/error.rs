//! Errors raised while driving Terraform.

use std::sync::Arc;

use tbk_process::ProcessError;
use thiserror::Error;

/// Errors raised while driving Terraform.
#[derive(Debug, Clone, Error)]
pub enum TerraformError {
    /// No usable `terraform` executable could be located.
    #[error("terraform binary not found: {message}")]
    NotFound {
        /// Why each lookup strategy failed.
        message: String,
        /// Underlying lookup error.
        #[source]
        source: ProcessError,
    },

    /// The `terraform` process could not be run.
    #[error("failed to run terraform {subcommand}")]
    Process {
        /// Subcommand being run.
        subcommand: &'static str,
        /// Underlying process error.
        #[source]
        source: ProcessError,
    },

    /// `terraform` exited with a failure status.
    #[error("terraform {subcommand} exited with status {status}: {stderr}")]
    CommandFailed {
        /// Subcommand being run.
        subcommand: &'static str,
        /// Exit status, or `signal` when the process was killed.
        status: String,
        /// Trimmed standard error.
        stderr: String,
    },

    /// `terraform show -json` produced output that is not JSON.
    #[error("terraform show produced invalid JSON")]
    InvalidPlanJson {
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },
}
