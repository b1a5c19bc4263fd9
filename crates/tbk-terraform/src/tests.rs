//! Unit tests for the Terraform driver.

use std::path::Path;

use camino::Utf8Path;
use mockall::mock;
use rstest::{fixture, rstest};
use serde_json::json;
use tbk_config::InitOptions;
use tbk_process::{CommandSpec, ProcessError, ProcessOutput, ProcessRunner};

use crate::{TerraformCli, TerraformError, TerraformRunner, lookup_path, resolve_exec_path};

mock! {
    Runner {}
    impl ProcessRunner for Runner {
        fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError>;
    }
}

const DIR: &str = "/work/app";
const PLAN: &str = "/work/app/plan.binary";

/// Builds a runner expecting one command with `args`, answering `output`.
fn runner_expecting(args: &'static [&'static str], output: ProcessOutput) -> MockRunner {
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(move |command| {
            command.program() == Path::new("/usr/bin/terraform")
                && command.arguments() == args
                && command.working_dir() == Some(Path::new(DIR))
                && command
                    .envs()
                    .iter()
                    .any(|(key, value)| key == "TF_IN_AUTOMATION" && value == "1")
        })
        .once()
        .return_once(move |_| Ok(output));
    runner
}

fn cli(runner: MockRunner) -> TerraformCli<MockRunner> {
    TerraformCli::new("/usr/bin/terraform", runner)
}

#[fixture]
fn dir() -> &'static Utf8Path {
    Utf8Path::new(DIR)
}

#[rstest]
fn init_passes_configured_options(dir: &Utf8Path) {
    let runner = runner_expecting(
        &[
            "init",
            "-input=false",
            "-no-color",
            "-get=false",
            "-plugin-dir=/opt/providers",
        ],
        ProcessOutput::succeeded(""),
    );
    let options = InitOptions {
        plugin_dir: Some("/opt/providers".into()),
        get_plugins: Some(false),
    };
    cli(runner).init(dir, &options).expect("init succeeds");
}

#[rstest]
fn init_failure_carries_stderr(dir: &Utf8Path) {
    let runner = runner_expecting(
        &["init", "-input=false", "-no-color"],
        ProcessOutput::exited(1, "Error: backend unreachable\n"),
    );
    let err = cli(runner)
        .init(dir, &InitOptions::default())
        .expect_err("init fails");
    assert_eq!(
        err.to_string(),
        "terraform init exited with status 1: Error: backend unreachable"
    );
}

#[rstest]
#[case::no_changes(0, false)]
#[case::changes(2, true)]
fn plan_reads_detailed_exit_code(dir: &Utf8Path, #[case] code: i32, #[case] expected: bool) {
    let runner = runner_expecting(
        &[
            "plan",
            "-input=false",
            "-no-color",
            "-detailed-exitcode",
            "-out=/work/app/plan.binary",
        ],
        ProcessOutput::new(Some(code), "", ""),
    );
    let has_changes = cli(runner)
        .plan(dir, Utf8Path::new(PLAN))
        .expect("plan succeeds");
    assert_eq!(has_changes, expected);
}

#[rstest]
fn plan_error_exit_is_a_failure(dir: &Utf8Path) {
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .return_once(|_| Ok(ProcessOutput::exited(1, "Error: invalid reference")));
    let err = cli(runner)
        .plan(dir, Utf8Path::new(PLAN))
        .expect_err("plan fails");
    assert!(matches!(err, TerraformError::CommandFailed { subcommand: "plan", .. }));
}

#[test]
fn relative_plan_file_is_made_relative_to_the_working_dir() {
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(|command| command.arguments().last().map(String::as_str) == Some("-out=plan.binary"))
        .return_once(|_| Ok(ProcessOutput::new(Some(0), "", "")));
    let has_changes = cli(runner)
        .plan(Utf8Path::new("app"), Utf8Path::new("app/plan.binary"))
        .expect("plan succeeds");
    assert!(!has_changes);
}

#[rstest]
fn show_parses_plan_json(dir: &Utf8Path) {
    let document = json!({"resource_changes": [{"address": "aws_s3_bucket.logs"}]});
    let runner = runner_expecting(
        &["show", "-json", "-no-color", PLAN],
        ProcessOutput::succeeded(document.to_string()),
    );
    let plan = cli(runner)
        .show_plan_file(dir, Utf8Path::new(PLAN))
        .expect("show succeeds");
    assert_eq!(plan.resource_changes().len(), 1);
    assert_eq!(
        plan.lookup("resource_changes.0.address"),
        Some(&json!("aws_s3_bucket.logs"))
    );
}

#[rstest]
fn show_rejects_non_json_output(dir: &Utf8Path) {
    let runner = runner_expecting(
        &["show", "-json", "-no-color", PLAN],
        ProcessOutput::succeeded("not json"),
    );
    let err = cli(runner)
        .show_plan_file(dir, Utf8Path::new(PLAN))
        .expect_err("show fails");
    assert!(matches!(err, TerraformError::InvalidPlanJson { .. }));
}

#[rstest]
fn apply_uses_the_saved_plan(dir: &Utf8Path) {
    let runner = runner_expecting(
        &["apply", "-input=false", "-no-color", "-auto-approve", PLAN],
        ProcessOutput::succeeded("Apply complete!"),
    );
    cli(runner)
        .apply(dir, Utf8Path::new(PLAN))
        .expect("apply succeeds");
}

#[rstest]
fn spawn_errors_are_process_errors(dir: &Utf8Path) {
    let mut runner = MockRunner::new();
    runner.expect_run().return_once(|command| {
        Err(ProcessError::StdinUnavailable {
            program: command.program().to_path_buf(),
        })
    });
    let err = cli(runner).apply(dir, Utf8Path::new(PLAN)).expect_err("apply fails");
    assert!(matches!(err, TerraformError::Process { subcommand: "apply", .. }));
}

#[test]
fn configured_exec_path_takes_precedence() {
    let temp = tempfile::tempdir().expect("temp dir");
    let configured = temp.path().join("terraform-1.9");
    let override_path = temp.path().join("terraform-cli");
    std::fs::write(&configured, "").expect("write configured");
    std::fs::write(&override_path, "").expect("write override");

    let chosen = resolve_exec_path(Some(configured.as_path()), Some(override_path.as_path())).expect("resolve");
    assert_eq!(chosen, configured);
    let chosen = resolve_exec_path(None, Some(override_path.as_path())).expect("resolve");
    assert_eq!(chosen, override_path);
}

#[test]
fn explicit_exec_path_must_be_a_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let err = resolve_exec_path(Some(temp.path()), None).expect_err("directory rejected");
    assert!(matches!(err, TerraformError::NotFound { .. }));
}

#[rstest]
#[case::root("", Some(json!({"a": [1, {"b": "x"}]})))]
#[case::nested("a.1.b", Some(json!("x")))]
#[case::bad_index("a.b", None)]
#[case::through_scalar("a.0.c", None)]
fn dotted_paths_walk_objects_and_arrays(
    #[case] path: &str,
    #[case] expected: Option<serde_json::Value>,
) {
    let value = json!({"a": [1, {"b": "x"}]});
    assert_eq!(lookup_path(&value, path), expected.as_ref());
}
