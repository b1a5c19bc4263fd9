//! Per-directory results and stage labels.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Stage label for a failed `terraform init`.
pub const STAGE_INITIALIZATION: &str = "initialization";
/// Stage label for planning, and for a successful plan-mode run.
pub const STAGE_PLANNING: &str = "planning";
/// Stage label for a failed `terraform show`.
pub const STAGE_SHOWING_PLAN: &str = "showing plan";
/// Stage label for validation.
pub const STAGE_VALIDATION: &str = "validation";
/// Stage label for a failed `terraform apply`.
pub const STAGE_APPLYING: &str = "applying";
/// Stage label for a successful apply-mode run.
pub const STAGE_APPLY: &str = "apply";

/// Message recorded when a plan has nothing to do.
pub const NO_CHANGES_MESSAGE: &str = "no changes detected in the Terraform plan";

/// Outcome of processing one working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceResult {
    /// Whether the directory finished without a failure.
    pub success: bool,
    /// Last stage reached.
    pub stage: &'static str,
    /// Directory processed.
    pub working_dir: Utf8PathBuf,
    /// Failure description, or an informational note for a no-op plan.
    pub error: Option<String>,
}

impl WorkspaceResult {
    pub(crate) fn failed(stage: &'static str, working_dir: &Utf8Path, error: String) -> Self {
        Self {
            success: false,
            stage,
            working_dir: working_dir.to_owned(),
            error: Some(error),
        }
    }

    pub(crate) fn succeeded(stage: &'static str, working_dir: &Utf8Path) -> Self {
        Self {
            success: true,
            stage,
            working_dir: working_dir.to_owned(),
            error: None,
        }
    }
}
