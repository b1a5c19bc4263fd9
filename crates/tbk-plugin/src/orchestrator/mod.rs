//! Per-directory Terraform lifecycle.
//!
//! [`Orchestrator::run`] drives one working directory through
//! `init → plan → validate → apply` and records a [`WorkspaceResult`]. The
//! first failing stage ends the run. A plan without changes ends it
//! successfully before validation, even in apply mode.
//!
//! Stage transitions are reported to a [`StageObserver`]:
//!
//! | transition                      | stage                         |
//! |---------------------------------|-------------------------------|
//! | init, plan or show failed       | `plan_failure`                |
//! | plan has no changes             | `plan_success_no_changes`     |
//! | a validator errored or rejected | `validation_failure`          |
//! | validators accepted the plan    | `validation_success`          |
//! | plan mode finished              | `plan_success_with_changes`   |
//! | apply failed                    | `apply_failure`               |
//! | apply finished                  | `apply_success`               |

mod observer;
mod result;

use camino::Utf8Path;
use tbk_adapters::{Stage, ValidationFailure, Validator};
use tbk_config::{InitOptions, Mode, PluginConfig};
use tbk_terraform::{PLAN_FILE, PlanDocument, TerraformRunner};
use tracing::{error, info, warn};

pub use observer::{NoopObserver, OutputObserver, StageEvent, StageObserver};
pub use result::{
    NO_CHANGES_MESSAGE, STAGE_APPLY, STAGE_APPLYING, STAGE_INITIALIZATION, STAGE_PLANNING,
    STAGE_SHOWING_PLAN, STAGE_VALIDATION, WorkspaceResult,
};

const ORCHESTRATOR_TARGET: &str = "tbk_plugin::orchestrator";

/// Runs the Terraform lifecycle for working directories, one at a time.
pub struct Orchestrator<T, O = NoopObserver> {
    mode: Mode,
    init_options: InitOptions,
    validators: Vec<Box<dyn Validator>>,
    terraform: T,
    observer: O,
}

impl<T: TerraformRunner> Orchestrator<T> {
    /// Creates an orchestrator for `config` that reports to no one.
    #[must_use]
    pub fn new(config: &PluginConfig, validators: Vec<Box<dyn Validator>>, terraform: T) -> Self {
        let init_options = config
            .terraform
            .as_ref()
            .and_then(|terraform| terraform.init_options.clone())
            .unwrap_or_default();
        Self {
            mode: config.mode,
            init_options,
            validators,
            terraform,
            observer: NoopObserver,
        }
    }
}

impl<T, O> Orchestrator<T, O> {
    /// Replaces the stage observer.
    #[must_use]
    pub fn with_observer<P: StageObserver>(self, observer: P) -> Orchestrator<T, P> {
        Orchestrator {
            mode: self.mode,
            init_options: self.init_options,
            validators: self.validators,
            terraform: self.terraform,
            observer,
        }
    }

    /// Operation mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }
}

impl<T, O> Orchestrator<T, O>
where
    T: TerraformRunner,
    O: StageObserver,
{
    /// Processes `working_dir` and returns its result.
    pub fn run(&self, working_dir: &Utf8Path) -> WorkspaceResult {
        info!(target: ORCHESTRATOR_TARGET, %working_dir, mode = %self.mode, "processing working directory");
        let plan_file = working_dir.join(PLAN_FILE);

        if let Err(err) = self.terraform.init(working_dir, &self.init_options) {
            error!(target: ORCHESTRATOR_TARGET, %working_dir, error = %err, "terraform init failed");
            let result = WorkspaceResult::failed(
                STAGE_INITIALIZATION,
                working_dir,
                format!("failed to run terraform init: {err}"),
            );
            return self.finish(Stage::PlanFailure, working_dir, None, &[], result);
        }

        let plan = match self.plan(working_dir, &plan_file) {
            Ok(plan) => plan,
            Err(result) => return result,
        };

        if let Some(result) = self.validate(working_dir, &plan) {
            return result;
        }

        match self.mode {
            Mode::Plan => {
                let result = WorkspaceResult::succeeded(STAGE_PLANNING, working_dir);
                self.finish(Stage::PlanSuccessWithChanges, working_dir, Some(&plan), &[], result)
            }
            Mode::Apply => self.apply(working_dir, &plan_file, &plan),
        }
    }

    fn plan(
        &self,
        working_dir: &Utf8Path,
        plan_file: &Utf8Path,
    ) -> Result<PlanDocument, WorkspaceResult> {
        let has_changes = self.terraform.plan(working_dir, plan_file).map_err(|err| {
            error!(target: ORCHESTRATOR_TARGET, %working_dir, %plan_file, error = %err, "terraform plan failed");
            let result = WorkspaceResult::failed(
                STAGE_PLANNING,
                working_dir,
                format!("failed to run terraform plan: {err}"),
            );
            self.finish(Stage::PlanFailure, working_dir, None, &[], result)
        })?;

        if !has_changes {
            info!(target: ORCHESTRATOR_TARGET, %working_dir, "plan has no changes");
            let result = WorkspaceResult {
                error: Some(NO_CHANGES_MESSAGE.to_owned()),
                ..WorkspaceResult::succeeded(STAGE_PLANNING, working_dir)
            };
            return Err(self.finish(Stage::PlanSuccessNoChanges, working_dir, None, &[], result));
        }

        self.terraform
            .show_plan_file(working_dir, plan_file)
            .map_err(|err| {
                error!(target: ORCHESTRATOR_TARGET, %working_dir, %plan_file, error = %err, "failed to show terraform plan file");
                let result = WorkspaceResult::failed(
                    STAGE_SHOWING_PLAN,
                    working_dir,
                    format!("failed to show plan file: {err}"),
                );
                self.finish(Stage::PlanFailure, working_dir, None, &[], result)
            })
    }

    /// Runs every validator in order. Returns a result only on failure.
    fn validate(&self, working_dir: &Utf8Path, plan: &PlanDocument) -> Option<WorkspaceResult> {
        let mut rejected = 0_usize;
        let mut failures: Vec<ValidationFailure> = Vec::new();

        for (index, validator) in self.validators.iter().enumerate() {
            match validator.validate(plan) {
                Ok(outcome) if outcome.passed => {}
                Ok(outcome) => {
                    warn!(
                        target: ORCHESTRATOR_TARGET,
                        %working_dir,
                        validator = index,
                        failures = outcome.failures.len(),
                        "validator rejected the plan"
                    );
                    rejected += 1;
                    failures.extend(outcome.failures);
                }
                Err(err) => {
                    error!(target: ORCHESTRATOR_TARGET, %working_dir, validator = index, error = %err, "validation failed");
                    let result = WorkspaceResult::failed(
                        STAGE_VALIDATION,
                        working_dir,
                        format!("validation failed: {err}"),
                    );
                    return Some(self.finish(
                        Stage::ValidationFailure,
                        working_dir,
                        Some(plan),
                        &failures,
                        result,
                    ));
                }
            }
        }

        if rejected > 0 {
            let result = WorkspaceResult::failed(
                STAGE_VALIDATION,
                working_dir,
                format!("validation failed with {rejected} issues"),
            );
            return Some(self.finish(
                Stage::ValidationFailure,
                working_dir,
                Some(plan),
                &failures,
                result,
            ));
        }

        if !self.validators.is_empty() {
            let interim = WorkspaceResult::succeeded(STAGE_VALIDATION, working_dir);
            self.emit(Stage::ValidationSuccess, working_dir, Some(plan), &[], &interim);
        }
        None
    }

    fn apply(
        &self,
        working_dir: &Utf8Path,
        plan_file: &Utf8Path,
        plan: &PlanDocument,
    ) -> WorkspaceResult {
        if let Err(err) = self.terraform.apply(working_dir, plan_file) {
            error!(target: ORCHESTRATOR_TARGET, %working_dir, %plan_file, error = %err, "terraform apply failed");
            let result = WorkspaceResult::failed(
                STAGE_APPLYING,
                working_dir,
                format!("failed to apply Terraform plan: {err}"),
            );
            return self.finish(Stage::ApplyFailure, working_dir, Some(plan), &[], result);
        }
        let result = WorkspaceResult::succeeded(STAGE_APPLY, working_dir);
        self.finish(Stage::ApplySuccess, working_dir, Some(plan), &[], result)
    }

    fn emit(
        &self,
        stage: Stage,
        working_dir: &Utf8Path,
        plan: Option<&PlanDocument>,
        failures: &[ValidationFailure],
        result: &WorkspaceResult,
    ) {
        self.observer.on_stage(&StageEvent {
            stage,
            working_dir,
            plan,
            result,
            failures,
        });
    }

    fn finish(
        &self,
        stage: Stage,
        working_dir: &Utf8Path,
        plan: Option<&PlanDocument>,
        failures: &[ValidationFailure],
        result: WorkspaceResult,
    ) -> WorkspaceResult {
        self.emit(stage, working_dir, plan, failures, &result);
        result
    }
}
