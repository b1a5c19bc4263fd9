//! Environment-plus-JSON configuration loader.

use serde_json::{Map, Value, json};
use tracing::{debug, error};

use crate::env::EnvSource;
use crate::error::ConfigError;
use crate::merge::merge_json;
use crate::model::PluginConfig;
use crate::raw::RawPlugin;
use crate::reference::{find_plugin, parse_plugins};
use crate::validate::validate;
use crate::{DEFAULT_PLUGINS_ENV, PARALLEL_JOB_COUNT_ENV, PARALLEL_JOB_ENV};

const LOADER_TARGET: &str = "tbk_config::loader";

/// Named options for [`ConfigLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Environment variable holding the plugin payload.
    pub plugins_env: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            plugins_env: DEFAULT_PLUGINS_ENV.to_owned(),
        }
    }
}

/// Loads [`PluginConfig`] values from an [`EnvSource`].
#[derive(Debug, Clone)]
pub struct ConfigLoader<E> {
    env: E,
    options: LoaderOptions,
}

impl<E: EnvSource> ConfigLoader<E> {
    /// Creates a loader with default options.
    #[must_use]
    pub fn new(env: E) -> Self {
        Self {
            env,
            options: LoaderOptions::default(),
        }
    }

    /// Replaces the loader options.
    #[must_use]
    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the environment the loader reads from.
    #[must_use]
    pub const fn env(&self) -> &E {
        &self.env
    }

    /// Loads and validates the configuration for `plugin`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the payload is missing or malformed,
    /// no entry matches `plugin`, an environment value cannot be parsed, or
    /// the merged configuration fails validation.
    pub fn load(&self, plugin: &str) -> Result<PluginConfig, ConfigError> {
        debug!(target: LOADER_TARGET, plugin, "initializing plugin configuration");
        self.load_inner(plugin).inspect_err(|err| {
            error!(
                target: LOADER_TARGET,
                plugin,
                error = %err,
                detail = ?err,
                "failed to load plugin configuration"
            );
        })
    }

    fn load_inner(&self, plugin: &str) -> Result<PluginConfig, ConfigError> {
        let variable = &self.options.plugins_env;
        let payload = self
            .env
            .var(variable)
            .ok_or_else(|| ConfigError::MissingPayload {
                variable: variable.clone(),
            })?;
        let entries = parse_plugins(&payload)?;
        let entry = find_plugin(&entries, plugin)?;

        let fragment = match &entry.config {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => {
                return Err(ConfigError::FragmentNotObject {
                    reference: entry.reference.clone(),
                });
            }
        };
        let working_from_fragment = fragment.contains_key("working");

        let mut document = self.env_shell()?;
        debug!(target: LOADER_TARGET, "applying JSON overrides to environment defaults");
        merge_json(&mut document, Value::Object(fragment));

        let raw: RawPlugin = serde_json::from_value(document).map_err(ConfigError::parse)?;
        let config = validate(raw, working_from_fragment)?;
        debug!(target: LOADER_TARGET, plugin, mode = %config.mode, "plugin configuration loaded");
        Ok(config)
    }

    /// Builds the baseline document from recognised environment variables.
    fn env_shell(&self) -> Result<Value, ConfigError> {
        let mut parallelism = Map::new();
        for (variable, field) in [
            (PARALLEL_JOB_ENV, "parallel_job"),
            (PARALLEL_JOB_COUNT_ENV, "parallel_job_count"),
        ] {
            if let Some(value) = self.int_var(variable)? {
                parallelism.insert(field.to_owned(), json!(value));
            }
        }

        if parallelism.is_empty() {
            Ok(json!({}))
        } else {
            Ok(json!({ "working": { "parallelism": parallelism } }))
        }
    }

    fn int_var(&self, variable: &str) -> Result<Option<i64>, ConfigError> {
        let Some(value) = self.env.var(variable).filter(|value| !value.trim().is_empty()) else {
            return Ok(None);
        };
        value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|source| ConfigError::Environment {
                variable: variable.to_owned(),
                value,
                source,
            })
    }
}
