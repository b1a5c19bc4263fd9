//! Plugin payload parsing and plugin lookup.

use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

const REFERENCE_TARGET: &str = "tbk_config::reference";

/// One `reference: fragment` pair from the plugin payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginEntry {
    /// Plugin reference as written in the pipeline, e.g.
    /// `github.com/org/terraform-buildkite-plugin#v1.0.0`.
    pub reference: String,
    /// Raw plugin-specific configuration.
    pub config: Value,
}

/// Extracts the short plugin name from a reference.
///
/// The scheme, host and `#version` fragment are dropped and the final path
/// segment is kept. References starting with `github.com/` are treated as
/// HTTPS URLs; other scheme-less references are treated as paths. When the
/// reference cannot be parsed at all it is returned unchanged.
///
/// ```
/// use tbk_config::plugin_short_name;
///
/// assert_eq!(
///     plugin_short_name("github.com/org/terraform-buildkite-plugin#v0.0.1"),
///     "terraform-buildkite-plugin"
/// );
/// assert_eq!(plugin_short_name("ssh://git@host/org/other#main"), "other");
/// ```
#[must_use]
pub fn plugin_short_name(reference: &str) -> String {
    let has_scheme = reference.contains("://");
    let parsed = if has_scheme {
        Url::parse(reference)
    } else if reference.starts_with("github.com/") {
        Url::parse(&format!("https://{reference}"))
    } else {
        Url::parse("https://plugin.invalid/").and_then(|base| base.join(reference))
    };

    match parsed {
        Ok(url) => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_owned)
            .unwrap_or_default(),
        Err(err) => {
            debug!(
                target: REFERENCE_TARGET,
                reference,
                error = %err,
                "failed to parse plugin reference as URL"
            );
            reference.to_owned()
        }
    }
}

/// Parses the plugin payload: a JSON array of one-key objects.
///
/// Entries are returned in payload order. An object holding several keys
/// contributes each of them, in key order.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the payload is not an array of
/// objects.
pub fn parse_plugins(payload: &str) -> Result<Vec<PluginEntry>, ConfigError> {
    debug!(target: REFERENCE_TARGET, "parsing plugin configuration JSON");
    let maps: Vec<Map<String, Value>> =
        serde_json::from_str(payload).map_err(ConfigError::parse)?;
    Ok(maps
        .into_iter()
        .flat_map(|map| {
            map.into_iter()
                .map(|(reference, config)| PluginEntry { reference, config })
        })
        .collect())
}

/// Finds the first entry whose short name starts with `plugin`.
///
/// # Errors
///
/// Returns [`ConfigError::PluginNotFound`] when nothing matches, including
/// when `entries` is empty.
pub fn find_plugin<'a>(
    entries: &'a [PluginEntry],
    plugin: &str,
) -> Result<&'a PluginEntry, ConfigError> {
    entries
        .iter()
        .find(|entry| plugin_short_name(&entry.reference).starts_with(plugin))
        .inspect(|entry| {
            debug!(
                target: REFERENCE_TARGET,
                matched_key = %entry.reference,
                "found matching plugin configuration"
            );
        })
        .ok_or_else(|| ConfigError::PluginNotFound {
            plugin: plugin.to_owned(),
        })
}
