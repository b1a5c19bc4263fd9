//! Operator dry-run flag.

use heck::ToShoutySnakeCase;

use crate::env::EnvSource;

/// Returns the name of the test-mode variable for `plugin`.
///
/// ```
/// assert_eq!(
///     tbk_config::test_mode_variable("terraform-buildkite-plugin"),
///     "BUILDKITE_PLUGIN_TERRAFORM_BUILDKITE_PLUGIN_TEST_MODE"
/// );
/// ```
#[must_use]
pub fn test_mode_variable(plugin: &str) -> String {
    format!("BUILDKITE_PLUGIN_{}_TEST_MODE", plugin.to_shouty_snake_case())
}

/// Returns `true` when the plugin's test-mode variable holds `true`, `1` or
/// `yes` (case-insensitive).
#[must_use]
pub fn is_test_mode(plugin: &str, env: &impl EnvSource) -> bool {
    env.var(&test_mode_variable(plugin)).is_some_and(|value| {
        let value = value.trim();
        ["true", "1", "yes"]
            .iter()
            .any(|truthy| value.eq_ignore_ascii_case(truthy))
    })
}
