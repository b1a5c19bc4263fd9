//! Top-level execution: configuration to exit status.

use std::io::Write;
use std::path::PathBuf;

use camino::Utf8Path;
use strum::Display;
use tbk_buildkite::GroupWriter;
use tbk_config::TerraformOptions;
use tbk_process::SystemProcessRunner;
use tbk_terraform::{TerraformCli, TerraformError, TerraformRunner, resolve_exec_path};
use tracing::{debug, error, info, warn};

use crate::error::HandlerError;
use crate::initiator::PluginInitiator;
use crate::orchestrator::{Orchestrator, OutputObserver, WorkspaceResult};

const HANDLER_TARGET: &str = "tbk_plugin::handler";

/// Process exit status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ExitStatus {
    /// Every directory succeeded.
    Success,
    /// The run could not start.
    UnexpectedFailure,
    /// At least one directory failed.
    HandledFailure,
    /// There was nothing to process.
    NoWorkingDirectories,
    /// Test mode printed the configuration and stopped.
    TestModeEarlyExit,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::UnexpectedFailure => 1,
            Self::HandledFailure => 2,
            Self::NoWorkingDirectories => 3,
            Self::TestModeEarlyExit => 10,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

/// Supplies the Terraform driver once configuration is known.
pub trait TerraformProvider {
    /// Driver type handed to the orchestrator.
    type Runner: TerraformRunner;

    /// Builds the driver.
    ///
    /// # Errors
    ///
    /// Returns a [`TerraformError`] when no usable executable exists.
    fn provide(&self, options: Option<&TerraformOptions>) -> Result<Self::Runner, TerraformError>;
}

/// Runs the real `terraform` executable.
#[derive(Debug, Clone, Default)]
pub struct SystemTerraform {
    override_path: Option<PathBuf>,
}

impl SystemTerraform {
    /// Uses `override_path` when the configuration names no executable.
    #[must_use]
    pub const fn new(override_path: Option<PathBuf>) -> Self {
        Self { override_path }
    }
}

impl TerraformProvider for SystemTerraform {
    type Runner = TerraformCli<SystemProcessRunner>;

    fn provide(&self, options: Option<&TerraformOptions>) -> Result<Self::Runner, TerraformError> {
        let configured = options
            .and_then(|options| options.exec_path.as_deref())
            .map(Utf8Path::as_std_path);
        let exec_path = resolve_exec_path(configured, self.override_path.as_deref())?;
        debug!(target: HANDLER_TARGET, terraform = %exec_path.display(), "using terraform executable");
        Ok(TerraformCli::new(exec_path, SystemProcessRunner))
    }
}

/// Drives one invocation from configuration to exit status.
#[derive(Debug, Clone)]
pub struct Handler<I, P> {
    plugin: String,
    initiator: I,
    terraform: P,
}

impl<I, P> Handler<I, P>
where
    I: PluginInitiator,
    P: TerraformProvider,
{
    /// Creates a handler for the plugin named `plugin`.
    #[must_use]
    pub fn new(plugin: impl Into<String>, initiator: I, terraform: P) -> Self {
        Self {
            plugin: plugin.into(),
            initiator,
            terraform,
        }
    }

    /// Runs every working directory once and aggregates the results.
    ///
    /// Log group headers go to `groups`. In test mode the resolved
    /// configuration is written to `diagnostics` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] when configuration, adapters, directories
    /// or the Terraform executable cannot be resolved. No directory has been
    /// processed in that case.
    pub fn handle<W, E>(
        &self,
        groups: &mut GroupWriter<W>,
        diagnostics: &mut E,
    ) -> Result<ExitStatus, HandlerError>
    where
        W: Write,
        E: Write,
    {
        let payload = self.initiator.parse_plugin(&self.plugin)?;

        if payload.test_mode {
            if let Err(err) = write_pretty_json(&payload.config, diagnostics) {
                warn!(target: HANDLER_TARGET, error = %err, "failed to pretty print plugin config");
            }
            info!(target: HANDLER_TARGET, "test mode is enabled, skipping plugin execution");
            return Ok(ExitStatus::TestModeEarlyExit);
        }

        if payload.directories.is_empty() {
            warn!(target: HANDLER_TARGET, "no working directories specified, skipping plugin execution");
            return Ok(ExitStatus::NoWorkingDirectories);
        }

        info!(
            target: HANDLER_TARGET,
            workspaces = payload.directories.len(),
            "starting plugin execution across workspaces"
        );
        let terraform = self.terraform.provide(payload.config.terraform.as_ref())?;
        let orchestrator = Orchestrator::new(&payload.config, payload.validators, terraform)
            .with_observer(OutputObserver::new(payload.outputers));

        let mut failures: Vec<WorkspaceResult> = Vec::new();
        for working_dir in &payload.directories {
            let name = working_dir.file_name().unwrap_or(working_dir.as_str());
            log_group(groups.open(format_args!(":terraform: {} {name}", orchestrator.mode())));
            let result = orchestrator.run(working_dir);
            if result.success {
                info!(target: HANDLER_TARGET, workspace = name, "workspace execution succeeded");
            } else {
                log_group(groups.open_current());
                warn!(target: HANDLER_TARGET, workspace = name, "workspace execution failed");
                failures.push(result);
            }
        }

        if failures.is_empty() {
            info!(target: HANDLER_TARGET, "plugin execution completed successfully across all workspaces");
            return Ok(ExitStatus::Success);
        }
        error!(target: HANDLER_TARGET, failures = failures.len(), "plugin execution failed in some workspaces");
        for failure in &failures {
            error!(
                target: HANDLER_TARGET,
                working_dir = %failure.working_dir,
                stage = failure.stage,
                error = failure.error.as_deref().unwrap_or_default(),
                "workspace execution failure"
            );
        }
        Ok(ExitStatus::HandledFailure)
    }
}

fn write_pretty_json<T: serde::Serialize>(value: &T, sink: &mut impl Write) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *sink, value)?;
    writeln!(sink)
}

fn log_group(outcome: std::io::Result<()>) {
    if let Err(err) = outcome {
        debug!(target: HANDLER_TARGET, error = %err, "failed to write log group header");
    }
}
