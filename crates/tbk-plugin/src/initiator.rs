//! Turning the environment into everything a run needs.

use camino::Utf8PathBuf;
use tbk_adapters::{Outputer, Validator, to_outputers, to_validators};
use tbk_buildkite::Agent;
use tbk_config::{ConfigLoader, EnvSource, PluginConfig, is_test_mode};
use tbk_process::ProcessRunner;
use tracing::{error, info};

use crate::error::HandlerError;

const INITIATOR_TARGET: &str = "tbk_plugin::initiator";

/// Configuration plus the adapters and directories built from it.
pub struct ParsedPayload {
    /// Validated configuration.
    pub config: PluginConfig,
    /// Validators, in evaluation order.
    pub validators: Vec<Box<dyn Validator>>,
    /// Outputers, in emission order.
    pub outputers: Vec<Box<dyn Outputer>>,
    /// Directories this job processes.
    pub directories: Vec<Utf8PathBuf>,
    /// Whether the plugin's test-mode flag is set.
    pub test_mode: bool,
}

impl std::fmt::Debug for ParsedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedPayload")
            .field("config", &self.config)
            .field("validators", &self.validators.len())
            .field("outputers", &self.outputers.len())
            .field("directories", &self.directories)
            .field("test_mode", &self.test_mode)
            .finish()
    }
}

/// Produces a [`ParsedPayload`] for a plugin name.
pub trait PluginInitiator {
    /// Loads configuration for `plugin` and builds its adapters and
    /// directory list.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] when any step fails. Nothing has been run
    /// at that point.
    fn parse_plugin(&self, plugin: &str) -> Result<ParsedPayload, HandlerError>;
}

/// Initiator backed by a [`ConfigLoader`].
///
/// OPA validators run through `runner`; annotation outputs go through
/// `agent`.
#[derive(Debug, Clone)]
pub struct ConfigInitiator<E, R, A> {
    loader: ConfigLoader<E>,
    runner: R,
    agent: A,
}

impl<E, R, A> ConfigInitiator<E, R, A>
where
    E: EnvSource,
    R: ProcessRunner + Clone + 'static,
    A: Agent + Clone + 'static,
{
    /// Creates an initiator.
    #[must_use]
    pub const fn new(loader: ConfigLoader<E>, runner: R, agent: A) -> Self {
        Self {
            loader,
            runner,
            agent,
        }
    }
}

impl<E, R, A> PluginInitiator for ConfigInitiator<E, R, A>
where
    E: EnvSource,
    R: ProcessRunner + Clone + 'static,
    A: Agent + Clone + 'static,
{
    fn parse_plugin(&self, plugin: &str) -> Result<ParsedPayload, HandlerError> {
        info!(target: INITIATOR_TARGET, plugin, "loading and parsing plugin configuration");
        let config = self.loader.load(plugin).inspect_err(|err| {
            error!(target: INITIATOR_TARGET, plugin, error = %err, "failed to initialize plugin");
        })?;

        let outputers = to_outputers(&config.outputs, &self.agent).map_err(|err| {
            error!(target: INITIATOR_TARGET, error = %err, "failed to convert outputs to outputers");
            HandlerError::Outputs(err)
        })?;
        let validators = to_validators(&config.validations, &self.runner).map_err(|err| {
            error!(target: INITIATOR_TARGET, error = %err, "failed to convert validations to validators");
            HandlerError::Validations(err)
        })?;
        let directories = tbk_workdir::resolve(config.working.as_ref()).map_err(|err| {
            error!(target: INITIATOR_TARGET, error = %err, "failed to parse working directories");
            HandlerError::WorkingDirectories(err)
        })?;

        info!(
            target: INITIATOR_TARGET,
            directories = directories.len(),
            validators = validators.len(),
            outputers = outputers.len(),
            "plugin configuration loaded and parsed"
        );
        Ok(ParsedPayload {
            test_mode: is_test_mode(plugin, self.loader.env()),
            config,
            validators,
            outputers,
            directories,
        })
    }
}
