//! Terraform CLI integration.
//!
//! [`TerraformRunner`] is the seam the orchestrator drives: `init`, `plan`
//! into a binary plan file, `show` that file as JSON, and `apply` exactly
//! that file. [`TerraformCli`] implements it by invoking the `terraform`
//! executable through a [`ProcessRunner`](tbk_process::ProcessRunner).

mod cli;
mod error;
mod exec_path;
mod plan;

pub use cli::{TerraformCli, TerraformRunner};
pub use error::TerraformError;
pub use exec_path::resolve_exec_path;
pub use plan::{PlanDocument, lookup_path};

/// File name of the binary plan written inside each working directory.
pub const PLAN_FILE: &str = "plan.binary";

#[cfg(test)]
mod tests;
