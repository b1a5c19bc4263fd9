//! `terraform` subprocess driver.

use std::path::PathBuf;

use camino::Utf8Path;
use tbk_config::InitOptions;
use tbk_process::{CommandSpec, ProcessOutput, ProcessRunner};
use tracing::{debug, info};

use crate::error::TerraformError;
use crate::plan::PlanDocument;

const TERRAFORM_TARGET: &str = "tbk_terraform::cli";

/// `plan -detailed-exitcode` status for a plan with pending changes.
const PLAN_HAS_CHANGES: i32 = 2;

/// Operations the orchestrator needs from Terraform.
///
/// Every method runs in `dir`. `plan_file` may be absolute or relative to
/// the current process directory.
pub trait TerraformRunner {
    /// Runs `terraform init`.
    ///
    /// # Errors
    ///
    /// Returns a [`TerraformError`] when the command cannot run or fails.
    fn init(&self, dir: &Utf8Path, options: &InitOptions) -> Result<(), TerraformError>;

    /// Runs `terraform plan`, saving the plan to `plan_file`, and reports
    /// whether the plan contains changes.
    ///
    /// # Errors
    ///
    /// Returns a [`TerraformError`] when the command cannot run or fails.
    fn plan(&self, dir: &Utf8Path, plan_file: &Utf8Path) -> Result<bool, TerraformError>;

    /// Renders a saved plan as a [`PlanDocument`].
    ///
    /// # Errors
    ///
    /// Returns a [`TerraformError`] when the command fails or its output is
    /// not JSON.
    fn show_plan_file(
        &self,
        dir: &Utf8Path,
        plan_file: &Utf8Path,
    ) -> Result<PlanDocument, TerraformError>;

    /// Applies a saved plan without re-planning.
    ///
    /// # Errors
    ///
    /// Returns a [`TerraformError`] when the command cannot run or fails.
    fn apply(&self, dir: &Utf8Path, plan_file: &Utf8Path) -> Result<(), TerraformError>;
}

/// Drives the real `terraform` executable.
#[derive(Debug, Clone)]
pub struct TerraformCli<R> {
    exec_path: PathBuf,
    runner: R,
}

impl<R: ProcessRunner> TerraformCli<R> {
    /// Creates a driver for the executable at `exec_path`.
    #[must_use]
    pub fn new(exec_path: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            exec_path: exec_path.into(),
            runner,
        }
    }

    /// Returns the executable this driver runs.
    #[must_use]
    pub fn exec_path(&self) -> &std::path::Path {
        &self.exec_path
    }

    fn command(&self, dir: &Utf8Path, subcommand: &str) -> CommandSpec {
        let mut command = CommandSpec::new(&self.exec_path);
        command
            .arg(subcommand)
            .current_dir(dir)
            .env("TF_IN_AUTOMATION", "1");
        command
    }

    fn run(
        &self,
        subcommand: &'static str,
        command: &CommandSpec,
    ) -> Result<ProcessOutput, TerraformError> {
        debug!(target: TERRAFORM_TARGET, %command, "running terraform");
        self.runner
            .run(command)
            .map_err(|source| TerraformError::Process { subcommand, source })
    }
}

/// Expresses `plan_file` relative to `dir` when it lies inside it, since
/// `terraform` runs with `dir` as its working directory.
fn plan_arg(dir: &Utf8Path, plan_file: &Utf8Path) -> String {
    if plan_file.is_absolute() {
        return plan_file.to_string();
    }
    plan_file
        .strip_prefix(dir)
        .unwrap_or(plan_file)
        .to_string()
}

fn failure(subcommand: &'static str, output: &ProcessOutput) -> TerraformError {
    TerraformError::CommandFailed {
        subcommand,
        status: output
            .code()
            .map_or_else(|| "signal".to_owned(), |code| code.to_string()),
        stderr: output.stderr().trim().to_owned(),
    }
}

impl<R: ProcessRunner> TerraformRunner for TerraformCli<R> {
    fn init(&self, dir: &Utf8Path, options: &InitOptions) -> Result<(), TerraformError> {
        let mut command = self.command(dir, "init");
        command.args(["-input=false", "-no-color"]);
        if let Some(get) = options.get_plugins {
            command.arg(format!("-get={get}"));
        }
        if let Some(plugin_dir) = &options.plugin_dir {
            command.arg(format!("-plugin-dir={plugin_dir}"));
        }

        let output = self.run("init", &command)?;
        if !output.success() {
            return Err(failure("init", &output));
        }
        info!(target: TERRAFORM_TARGET, working_dir = %dir, "terraform init completed");
        Ok(())
    }

    fn plan(&self, dir: &Utf8Path, plan_file: &Utf8Path) -> Result<bool, TerraformError> {
        let mut command = self.command(dir, "plan");
        command.args([
            "-input=false".to_owned(),
            "-no-color".to_owned(),
            "-detailed-exitcode".to_owned(),
            format!("-out={}", plan_arg(dir, plan_file)),
        ]);

        let output = self.run("plan", &command)?;
        let has_changes = match output.code() {
            Some(0) => false,
            Some(PLAN_HAS_CHANGES) => true,
            _ => return Err(failure("plan", &output)),
        };
        info!(
            target: TERRAFORM_TARGET,
            working_dir = %dir,
            has_changes,
            "terraform plan completed"
        );
        Ok(has_changes)
    }

    fn show_plan_file(
        &self,
        dir: &Utf8Path,
        plan_file: &Utf8Path,
    ) -> Result<PlanDocument, TerraformError> {
        let mut command = self.command(dir, "show");
        command.args(["-json".to_owned(), "-no-color".to_owned(), plan_arg(dir, plan_file)]);

        let output = self.run("show", &command)?;
        if !output.success() {
            return Err(failure("show", &output));
        }
        let value = serde_json::from_str(output.stdout()).map_err(|err| {
            TerraformError::InvalidPlanJson {
                source: std::sync::Arc::new(err),
            }
        })?;
        Ok(PlanDocument::new(value))
    }

    fn apply(&self, dir: &Utf8Path, plan_file: &Utf8Path) -> Result<(), TerraformError> {
        let mut command = self.command(dir, "apply");
        command.args([
            "-input=false".to_owned(),
            "-no-color".to_owned(),
            "-auto-approve".to_owned(),
            plan_arg(dir, plan_file),
        ]);

        let output = self.run("apply", &command)?;
        if !output.success() {
            return Err(failure("apply", &output));
        }
        info!(target: TERRAFORM_TARGET, working_dir = %dir, "terraform apply completed");
        Ok(())
    }
}
