//! Buildkite plugin runtime for Terraform.
//!
//! The binary reads its configuration from the `BUILDKITE_PLUGINS`
//! environment variable, resolves the working directories assigned to this
//! job, and runs `terraform init`, `plan`, policy validation and, in apply
//! mode, `apply` for each one. Results are aggregated into the process exit
//! status ([`ExitStatus`]).
//!
//! The pieces are separable for tests: [`PluginInitiator`] produces the
//! configuration and adapters, [`TerraformProvider`] produces the Terraform
//! driver, and [`Orchestrator`] runs one directory. [`run`] wires the real
//! implementations together.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tbk_buildkite::{BuildkiteAgent, GroupWriter};
use tbk_config::{ConfigLoader, EnvSource, LoaderOptions, LogSettings, ProcessEnv};
use tbk_process::SystemProcessRunner;
use tracing::{debug, error, info};

mod cli;
mod error;
mod handler;
mod initiator;
pub mod metadata;
pub mod orchestrator;
pub mod telemetry;

pub use cli::Cli;
pub use error::HandlerError;
pub use handler::{ExitStatus, Handler, SystemTerraform, TerraformProvider};
pub use initiator::{ConfigInitiator, ParsedPayload, PluginInitiator};
pub use metadata::{PLUGIN_NAME, PluginMetadata};
pub use orchestrator::{
    NoopObserver, Orchestrator, OutputObserver, StageEvent, StageObserver, WorkspaceResult,
};

const RUN_TARGET: &str = "tbk_plugin::run";

/// Runs the plugin with the given arguments and output streams.
///
/// Log group headers are written to `stdout`; test-mode output and argument
/// errors go to `stderr`. Diagnostics go through `tracing` to the process's
/// standard error.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let sink: &mut dyn Write = if err.use_stderr() { stderr } else { stdout };
            let _ = write!(sink, "{}", err.render());
            return if err.use_stderr() {
                ExitStatus::UnexpectedFailure.into()
            } else {
                ExitStatus::Success.into()
            };
        }
    };

    if let Err(err) = telemetry::initialise(&LogSettings::from_env(&ProcessEnv)) {
        let _ = writeln!(stderr, "{err}");
    }

    execute(&cli, ProcessEnv, stdout, stderr).into()
}

/// Runs one invocation against `env` and returns its exit status.
///
/// Handler errors are logged and reported as
/// [`ExitStatus::UnexpectedFailure`].
pub fn execute<En, W, E>(cli: &Cli, env: En, stdout: &mut W, stderr: &mut E) -> ExitStatus
where
    En: EnvSource,
    W: Write,
    E: Write,
{
    let metadata = PluginMetadata::current();
    let mut groups = GroupWriter::new(stdout);
    if let Err(err) = groups.closed(format_args!(
        "running {} version {}",
        metadata.name, metadata.version
    )) {
        debug!(target: RUN_TARGET, error = %err, "failed to write log group header");
    }
    debug!(target: RUN_TARGET, commit = metadata.commit, date = metadata.date, "plugin metadata");

    let loader = ConfigLoader::new(env).with_options(LoaderOptions {
        plugins_env: cli.plugins_env.clone(),
    });
    let initiator = ConfigInitiator::new(
        loader,
        SystemProcessRunner,
        BuildkiteAgent::new(SystemProcessRunner),
    );
    let handler = Handler::new(
        &cli.plugin_name,
        initiator,
        SystemTerraform::new(cli.terraform_path.clone()),
    );

    let status = match handler.handle(&mut groups, stderr) {
        Ok(status) => status,
        Err(err) => {
            let _ = groups.open_current();
            error!(target: RUN_TARGET, error = %err, "failed to handle plugin execution");
            ExitStatus::UnexpectedFailure
        }
    };
    info!(target: RUN_TARGET, %status, "plugin exiting with status");
    status
}

#[cfg(test)]
mod tests;
