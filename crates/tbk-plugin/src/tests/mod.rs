//! Unit and behavioural tests for the plugin runtime.


use std::cell::RefCell;

use camino::Utf8Path;
use mockall::mock;
use serde_json::json;
use tbk_adapters::{PolicyError, Stage, ValidationFailure, ValidationResult, Validator};
use tbk_config::{InitOptions, Mode, PluginConfig};
use tbk_terraform::{PlanDocument, TerraformError, TerraformRunner};

use crate::orchestrator::{StageEvent, StageObserver};

mock! {
    pub Terraform {}
    impl TerraformRunner for Terraform {
        fn init(&self, dir: &Utf8Path, options: &InitOptions) -> Result<(), TerraformError>;
        fn plan(&self, dir: &Utf8Path, plan_file: &Utf8Path) -> Result<bool, TerraformError>;
        fn show_plan_file(
            &self,
            dir: &Utf8Path,
            plan_file: &Utf8Path,
        ) -> Result<PlanDocument, TerraformError>;
        fn apply(&self, dir: &Utf8Path, plan_file: &Utf8Path) -> Result<(), TerraformError>;
    }
}

mock! {
    pub PlanValidator {}
    impl Validator for PlanValidator {
        fn validate(&self, plan: &PlanDocument) -> Result<ValidationResult, PolicyError>;
    }
}

/// Records the stages it is told about.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    stages: RefCell<Vec<Stage>>,
}

impl RecordingObserver {
    pub(crate) fn stages(&self) -> Vec<Stage> {
        self.stages.borrow().clone()
    }
}

impl StageObserver for RecordingObserver {
    fn on_stage(&self, event: &StageEvent<'_>) {
        self.stages.borrow_mut().push(event.stage);
    }
}

pub(crate) fn config(mode: Mode) -> PluginConfig {
    PluginConfig {
        mode,
        working: None,
        terraform: None,
        validations: Vec::new(),
        outputs: Vec::new(),
    }
}

pub(crate) fn plan_document() -> PlanDocument {
    PlanDocument::new(json!({
        "format_version": "1.2",
        "resource_changes": [{"address": "aws_s3_bucket.logs"}]
    }))
}

pub(crate) fn command_failed(subcommand: &'static str) -> TerraformError {
    TerraformError::CommandFailed {
        subcommand,
        status: "1".to_owned(),
        stderr: format!("{subcommand} exploded"),
    }
}

/// A validator that runs exactly once and passes or rejects the plan.
pub(crate) fn validator(passes: bool) -> Box<dyn Validator> {
    let mut validator = MockPlanValidator::new();
    validator.expect_validate().once().return_once(move |_| {
        Ok(if passes {
            ValidationResult::pass()
        } else {
            ValidationResult::from_failures(vec![ValidationFailure {
                kind: "data.terraform.deny".to_owned(),
                message: "bucket is public".to_owned(),
                location: "violation[0]".to_owned(),
                details: None,
            }])
        })
    });
    Box::new(validator)
}

/// A validator that must never run.
pub(crate) fn untouched_validator() -> Box<dyn Validator> {
    let mut validator = MockPlanValidator::new();
    validator.expect_validate().never();
    Box::new(validator)
}

/// Terraform double whose plan has changes and whose every step succeeds.
pub(crate) fn terraform_with_changes() -> MockTerraform {
    let mut terraform = MockTerraform::new();
    terraform.expect_init().once().returning(|_, _| Ok(()));
    terraform.expect_plan().once().returning(|_, _| Ok(true));
    terraform
        .expect_show_plan_file()
        .once()
        .returning(|_, _| Ok(plan_document()));
    terraform
}
