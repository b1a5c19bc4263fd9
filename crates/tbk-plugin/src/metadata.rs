//! Build metadata reported at start-up.

/// Name the plugin is published under. Also the default plugin reference
/// looked up in `BUILDKITE_PLUGINS`.
pub const PLUGIN_NAME: &str = "terraform-buildkite-plugin";

/// Identity of the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginMetadata {
    /// Plugin name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Source commit, when provided at build time.
    pub commit: &'static str,
    /// Build date, when provided at build time.
    pub date: &'static str,
}

impl PluginMetadata {
    /// Metadata baked into this build.
    ///
    /// `TBK_BUILD_COMMIT` and `TBK_BUILD_DATE` are read at compile time and
    /// default to `unknown`.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            name: PLUGIN_NAME,
            version: env!("CARGO_PKG_VERSION"),
            commit: match option_env!("TBK_BUILD_COMMIT") {
                Some(commit) => commit,
                None => "unknown",
            },
            date: match option_env!("TBK_BUILD_DATE") {
                Some(date) => date,
                None => "unknown",
            },
        }
    }
}

impl Default for PluginMetadata {
    fn default() -> Self {
        Self::current()
    }
}
