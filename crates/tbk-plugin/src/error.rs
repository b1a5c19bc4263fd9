//! Errors that abort an invocation before any directory is processed.

use tbk_adapters::AdapterError;
use tbk_config::ConfigError;
use tbk_terraform::TerraformError;
use tbk_workdir::WorkingDirError;
use thiserror::Error;

/// Errors surfaced by the execution handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Working directories could not be resolved.
    #[error("failed to parse working directories")]
    WorkingDirectories(#[source] WorkingDirError),

    /// Validators could not be built.
    #[error("failed to convert validations")]
    Validations(#[source] AdapterError),

    /// Outputers could not be built.
    #[error("failed to convert outputs")]
    Outputs(#[source] AdapterError),

    /// No usable Terraform executable.
    #[error(transparent)]
    Terraform(#[from] TerraformError),
}
