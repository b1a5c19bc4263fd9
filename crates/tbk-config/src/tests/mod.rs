//! Unit and behavioural tests for configuration loading.


use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

use crate::{
    ConfigError, ConfigLoader, DirectoriesSpec, LoaderOptions, LogFormat, LogSettings, MapEnv,
    Mode, Parallelism, WorkingLocation, find_plugin, is_test_mode, parse_plugins,
    plugin_short_name,
};

const PLUGIN: &str = "terraform-buildkite-plugin";

#[fixture]
fn workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for name in ["app", "modules"] {
        std::fs::create_dir(dir.path().join(name)).expect("create dir");
    }
    std::fs::write(dir.path().join("terraform"), "").expect("write file");
    dir
}

fn path_of(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

fn payload(fragment: &serde_json::Value) -> String {
    let mut entry = serde_json::Map::new();
    entry.insert(format!("github.com/org/{PLUGIN}#v1.0.0"), fragment.clone());
    serde_json::Value::Array(vec![entry.into()]).to_string()
}

fn load(env: MapEnv) -> Result<crate::PluginConfig, ConfigError> {
    ConfigLoader::new(env).load(PLUGIN)
}

#[rstest]
#[case::github("github.com/org/terraform-buildkite-plugin#v0.0.1", PLUGIN)]
#[case::https("https://github.com/org/terraform-buildkite-plugin#v2", PLUGIN)]
#[case::ssh("ssh://git@github.com/org/terraform-buildkite-plugin.git", "terraform-buildkite-plugin.git")]
#[case::bare_name("terraform-buildkite-plugin#v1", PLUGIN)]
#[case::relative_path("plugins/terraform-buildkite-plugin", PLUGIN)]
fn short_name_keeps_last_segment(#[case] reference: &str, #[case] expected: &str) {
    assert_eq!(plugin_short_name(reference), expected);
}

#[test]
fn unparsable_reference_is_returned_unchanged() {
    assert_eq!(plugin_short_name("http://[::1"), "http://[::1");
}

#[test]
fn lookup_matches_on_name_prefix() {
    let entries = parse_plugins(
        r#"[{"github.com/org/docker-plugin#v1": {}}, {"github.com/org/terraform-buildkite-plugin#v0.0.1": {"mode": "plan"}}]"#,
    )
    .expect("parse payload");
    let entry = find_plugin(&entries, "terraform-buildkite").expect("entry found");
    assert_eq!(entry.config, json!({"mode": "plan"}));
}

#[rstest]
#[case::other_plugin(r#"[{"github.com/org/other-plugin#v0.0.1": {}}]"#)]
#[case::empty("[]")]
fn lookup_without_match_fails(#[case] raw: &str) {
    let entries = parse_plugins(raw).expect("parse payload");
    let err = find_plugin(&entries, PLUGIN).expect_err("lookup must fail");
    assert_eq!(err.to_string(), "could not initialize plugin");
}

#[rstest]
#[case::not_json("{not json")]
#[case::not_array(r#"{"a": {}}"#)]
fn malformed_payload_has_generic_message(#[case] raw: &str) {
    let err = parse_plugins(raw).expect_err("parse must fail");
    assert_eq!(err.to_string(), "failed to parse plugin configuration");
}

#[test]
fn missing_payload_variable_fails_to_parse() {
    let err = load(MapEnv::new()).expect_err("load must fail");
    assert!(matches!(err, ConfigError::MissingPayload { .. }));
    assert_eq!(err.to_string(), "failed to parse plugin configuration");
}

#[test]
fn custom_payload_variable_is_honoured() {
    let env = MapEnv::new().with("CUSTOM_PLUGINS", payload(&json!({"mode": "apply"})));
    let config = ConfigLoader::new(env)
        .with_options(LoaderOptions {
            plugins_env: String::from("CUSTOM_PLUGINS"),
        })
        .load(PLUGIN)
        .expect("load config");
    assert_eq!(config.mode, Mode::Apply);
    assert!(config.working.is_none());
}

#[rstest]
fn single_directory_is_loaded(workspace: TempDir) {
    let app = path_of(&workspace, "app");
    let env = MapEnv::new().with(
        "BUILDKITE_PLUGINS",
        payload(&json!({"mode": "plan", "working": {"directory": app}})),
    );
    let config = load(env).expect("load config");
    let working = config.working.expect("working spec");
    assert_eq!(working.location, WorkingLocation::Directory(app.into()));
    assert!(working.parallelism.is_none());
}

#[rstest]
fn environment_parallelism_survives_json_overlay(workspace: TempDir) {
    let parent = path_of(&workspace, "modules");
    let env = MapEnv::new()
        .with("BUILDKITE_PARALLEL_JOB", "1")
        .with("BUILDKITE_PARALLEL_JOB_COUNT", "3")
        .with(
            "BUILDKITE_PLUGINS",
            payload(&json!({
                "mode": "plan",
                "working": {"directories": {"parent_directory": parent, "name_regex": ".*"}}
            })),
        );
    let working = load(env).expect("load config").working.expect("working");
    assert_eq!(
        working.parallelism,
        Some(Parallelism {
            parallel_job: 1,
            parallel_job_count: 3
        })
    );
    assert!(matches!(
        working.location,
        WorkingLocation::Directories(DirectoriesSpec::ParentDirectory { .. })
    ));
}

#[rstest]
fn json_parallelism_wins_over_environment(workspace: TempDir) {
    let app = path_of(&workspace, "app");
    let env = MapEnv::new()
        .with("BUILDKITE_PARALLEL_JOB", "0")
        .with("BUILDKITE_PARALLEL_JOB_COUNT", "2")
        .with(
            "BUILDKITE_PLUGINS",
            payload(&json!({
                "mode": "plan",
                "working": {"directory": app, "parallelism": {"parallel_job": 3, "parallel_job_count": 4}}
            })),
        );
    let working = load(env).expect("load config").working.expect("working");
    assert_eq!(
        working.parallelism,
        Some(Parallelism {
            parallel_job: 3,
            parallel_job_count: 4
        })
    );
}

#[test]
fn environment_only_parallelism_leaves_working_absent() {
    let env = MapEnv::new()
        .with("BUILDKITE_PARALLEL_JOB", "0")
        .with("BUILDKITE_PARALLEL_JOB_COUNT", "2")
        .with("BUILDKITE_PLUGINS", payload(&json!({"mode": "plan"})));
    assert!(load(env).expect("load config").working.is_none());
}

#[test]
fn non_numeric_parallel_job_is_an_environment_error() {
    let env = MapEnv::new()
        .with("BUILDKITE_PARALLEL_JOB", "first")
        .with("BUILDKITE_PLUGINS", payload(&json!({"mode": "plan"})));
    let err = load(env).expect_err("load must fail");
    assert_eq!(err.to_string(), "failed to parse environment variables");
}

#[rstest]
#[case::missing_mode(json!({}), "mode is required")]
#[case::unknown_mode(json!({"mode": "destroy"}), "mode 'destroy'")]
#[case::empty_working(json!({"mode": "plan", "working": {}}), "requires one of directory")]
#[case::missing_directory(json!({"mode": "plan", "working": {"directory": "/no/such/dir"}}), "not an existing directory")]
#[case::empty_directories(json!({"mode": "plan", "working": {"directories": {}}}), "requires one of parent_directory")]
#[case::bad_opa(json!({"mode": "plan", "validations": [{"opa": {"bundle": "", "query": "q"}}]}), "opa.bundle is required")]
#[case::bad_template(json!({"mode": "plan", "outputs": [{"buildkite_annotation": {"template": ""}}]}), "template is required")]
fn invalid_fragments_fail_validation(#[case] fragment: serde_json::Value, #[case] needle: &str) {
    let env = MapEnv::new().with("BUILDKITE_PLUGINS", payload(&fragment));
    let err = load(env).expect_err("validation must fail");
    let message = err.to_string();
    assert!(
        message.starts_with("failed to validate config: "),
        "unexpected message {message:?}"
    );
    assert!(message.contains(needle), "{message:?} lacks {needle:?}");
}

#[rstest]
fn both_directory_and_directories_are_rejected(workspace: TempDir) {
    let fragment = json!({
        "mode": "plan",
        "working": {
            "directory": path_of(&workspace, "app"),
            "directories": {"parent_directory": path_of(&workspace, "modules")}
        }
    });
    let env = MapEnv::new().with("BUILDKITE_PLUGINS", payload(&fragment));
    let err = load(env).expect_err("validation must fail");
    assert!(err.to_string().contains("mutually exclusive"));
}

#[rstest]
fn parent_directory_and_artifact_are_rejected(workspace: TempDir) {
    let fragment = json!({
        "mode": "plan",
        "working": {"directories": {
            "parent_directory": path_of(&workspace, "modules"),
            "artifact": path_of(&workspace, "terraform")
        }}
    });
    let env = MapEnv::new().with("BUILDKITE_PLUGINS", payload(&fragment));
    let err = load(env).expect_err("validation must fail");
    assert!(err.to_string().contains("mutually exclusive"));
}

#[rstest]
#[case::job_equals_count(2, 2)]
#[case::job_exceeds_count(5, 2)]
#[case::negative(-1, 2)]
fn out_of_range_parallelism_is_rejected(workspace: TempDir, #[case] job: i64, #[case] count: i64) {
    let fragment = json!({
        "mode": "plan",
        "working": {
            "directory": path_of(&workspace, "app"),
            "parallelism": {"parallel_job": job, "parallel_job_count": count}
        }
    });
    let env = MapEnv::new().with("BUILDKITE_PLUGINS", payload(&fragment));
    assert!(matches!(
        load(env).expect_err("validation must fail"),
        ConfigError::Validation { .. }
    ));
}

#[rstest]
fn half_configured_parallelism_is_rejected(workspace: TempDir) {
    let env = MapEnv::new().with("BUILDKITE_PARALLEL_JOB", "0").with(
        "BUILDKITE_PLUGINS",
        payload(&json!({"mode": "plan", "working": {"directory": path_of(&workspace, "app")}})),
    );
    let err = load(env).expect_err("validation must fail");
    assert!(err.to_string().contains("must be set together"));
}

#[rstest]
fn terraform_options_are_checked(workspace: TempDir) {
    let fragment = json!({
        "mode": "apply",
        "terraform": {
            "exec_path": path_of(&workspace, "terraform"),
            "init_options": {"plugin_dir": path_of(&workspace, "modules"), "get_plugins": false}
        }
    });
    let env = MapEnv::new().with("BUILDKITE_PLUGINS", payload(&fragment));
    let terraform = load(env).expect("load config").terraform.expect("terraform");
    let init = terraform.init_options.expect("init options");
    assert_eq!(init.get_plugins, Some(false));

    let fragment = json!({"mode": "apply", "terraform": {"exec_path": path_of(&workspace, "app")}});
    let env = MapEnv::new().with("BUILDKITE_PLUGINS", payload(&fragment));
    assert!(
        load(env)
            .expect_err("directory is not an executable")
            .to_string()
            .contains("terraform.exec_path")
    );
}

#[test]
fn invalid_computed_var_regex_is_rejected() {
    let fragment = json!({
        "mode": "plan",
        "outputs": [{"buildkite_annotation": {
            "template": "t.md",
            "computed_vars": [{"name": "n", "from": "a.b", "regex": "("}]
        }}]
    });
    let env = MapEnv::new().with("BUILDKITE_PLUGINS", payload(&fragment));
    assert!(
        load(env)
            .expect_err("regex must fail")
            .to_string()
            .contains("not a valid regex")
    );
}

#[rstest]
#[case::lower("true", true)]
#[case::upper("YES", true)]
#[case::one("1", true)]
#[case::zero("0", false)]
#[case::other("enabled", false)]
fn test_mode_accepts_truthy_values(#[case] value: &str, #[case] expected: bool) {
    let env = MapEnv::new().with("BUILDKITE_PLUGIN_TERRAFORM_BUILDKITE_PLUGIN_TEST_MODE", value);
    assert_eq!(is_test_mode(PLUGIN, &env), expected);
}

#[test]
fn test_mode_is_off_when_unset() {
    assert!(!is_test_mode(PLUGIN, &MapEnv::new()));
}

#[rstest]
#[case::defaults(None, None, "info", LogFormat::Compact, None)]
#[case::json(Some("debug"), Some("JSON"), "debug", LogFormat::Json, None)]
#[case::rejected(None, Some("xml"), "info", LogFormat::Compact, Some("xml"))]
fn log_settings_read_environment(
    #[case] level: Option<&str>,
    #[case] format: Option<&str>,
    #[case] filter: &str,
    #[case] expected_format: LogFormat,
    #[case] rejected: Option<&str>,
) {
    let mut env = MapEnv::new();
    if let Some(level) = level {
        env.set("LOG_LEVEL", level);
    }
    if let Some(format) = format {
        env.set("LOG_FORMAT", format);
    }
    let settings = LogSettings::from_env(&env);
    assert_eq!(settings.filter(), filter);
    assert_eq!(settings.format(), expected_format);
    assert_eq!(settings.rejected_format(), rejected);
}

#[test]
fn merge_replaces_scalars_and_arrays() {
    let mut base = json!({"a": [1, 2], "b": {"c": 1, "d": 2}});
    crate::merge_json(&mut base, json!({"a": [3], "b": {"d": null}}));
    assert_eq!(base, json!({"a": [3], "b": {"c": 1, "d": null}}));
}
