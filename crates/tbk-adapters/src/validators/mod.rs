//! Plan validators.

mod opa;
mod policy;
mod result;

use tbk_config::ValidationSpec;
use tbk_process::ProcessRunner;
use tbk_terraform::PlanDocument;
use tracing::{debug, info};

use crate::error::{AdapterError, PolicyError};

pub use opa::{OpaValidator, convert_violations};
pub use policy::{OpaCli, PolicyEvaluator, filter_result};
pub use result::{ValidationFailure, ValidationResult};

/// Judges a Terraform plan.
///
/// Returning `Ok` with `passed: false` means the plan was evaluated and
/// rejected. `Err` means the evaluation itself could not be carried out.
pub trait Validator {
    /// Evaluates `plan`.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] when evaluation cannot be completed.
    fn validate(&self, plan: &PlanDocument) -> Result<ValidationResult, PolicyError>;
}

impl<T> Validator for Box<T>
where
    T: Validator + ?Sized,
{
    fn validate(&self, plan: &PlanDocument) -> Result<ValidationResult, PolicyError> {
        (**self).validate(plan)
    }
}

/// Builds one validator per configured entry, in order.
///
/// OPA validators run the `opa` executable through `runner`.
///
/// # Errors
///
/// Returns [`AdapterError::UnknownValidation`] for an entry with no
/// recognised validator.
pub fn to_validators<R>(
    specs: &[ValidationSpec],
    runner: &R,
) -> Result<Vec<Box<dyn Validator>>, AdapterError>
where
    R: ProcessRunner + Clone + 'static,
{
    if specs.is_empty() {
        info!(target: "tbk_adapters::validators", "no validations defined");
        return Ok(Vec::new());
    }

    let mut validators: Vec<Box<dyn Validator>> = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let Some(opa) = &spec.opa else {
            return Err(AdapterError::UnknownValidation { index });
        };
        debug!(target: "tbk_adapters::validators", index, query = %opa.query, "creating OPA validator");
        let evaluator = OpaCli::new(&opa.bundle, &opa.query, runner.clone())
            .with_condition(opa.condition.clone());
        validators.push(Box::new(OpaValidator::new(
            format!("opa-validator-{index}"),
            &opa.query,
            evaluator,
        )));
    }
    info!(target: "tbk_adapters::validators", count = validators.len(), "validators ready");
    Ok(validators)
}
