//! OPA-backed plan validation.

use serde_json::{Map, Value, json};
use tbk_terraform::PlanDocument;
use tracing::{info, warn};

use super::policy::PolicyEvaluator;
use super::result::{ValidationFailure, ValidationResult};
use super::Validator;
use crate::error::PolicyError;

const MESSAGE_KEYS: [&str; 5] = ["message", "msg", "description", "error", "reason"];
const LOCATION_KEYS: [&str; 5] = ["path", "location", "resource", "field", "attribute"];

/// Validates plans by evaluating a policy query against them.
#[derive(Debug, Clone)]
pub struct OpaValidator<E> {
    name: String,
    query: String,
    evaluator: E,
}

impl<E: PolicyEvaluator> OpaValidator<E> {
    /// Creates a validator named `name` whose failures are tagged with
    /// `query`.
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<String>, evaluator: E) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            evaluator,
        }
    }

    /// Validator name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<E: PolicyEvaluator> Validator for OpaValidator<E> {
    fn validate(&self, plan: &PlanDocument) -> Result<ValidationResult, PolicyError> {
        let violations = self.evaluator.eval(plan.as_value())?;
        if violations.is_empty() {
            info!(target: "tbk_adapters::opa", validator = %self.name, "policy validation passed");
            return Ok(ValidationResult::pass());
        }

        let failures = convert_violations(&self.query, &violations);
        warn!(
            target: "tbk_adapters::opa",
            validator = %self.name,
            violations = failures.len(),
            "policy validation failed"
        );
        Ok(ValidationResult::from_failures(failures))
    }
}

/// Turns raw policy violations into [`ValidationFailure`] values tagged with
/// `kind`.
///
/// Strings become the message. Objects contribute a message from the first
/// of `message`, `msg`, `description`, `error` or `reason`, and a location
/// from the first of `path`, `location`, `resource`, `field` or
/// `attribute`. Anything else is reported as raw JSON.
#[must_use]
pub fn convert_violations(kind: &str, violations: &[Value]) -> Vec<ValidationFailure> {
    violations
        .iter()
        .enumerate()
        .map(|(index, violation)| convert_one(kind, index, violation))
        .collect()
}

fn convert_one(kind: &str, index: usize, violation: &Value) -> ValidationFailure {
    let fallback_location = format!("violation[{index}]");
    let (message, location, details) = match violation {
        Value::String(text) => (text.clone(), fallback_location, None),
        Value::Object(fields) => (
            first_string(fields, &MESSAGE_KEYS)
                .unwrap_or_else(|| format!("Policy violation: {violation}")),
            first_string(fields, &LOCATION_KEYS)
                .or_else(|| resource_action(fields))
                .unwrap_or_default(),
            Some(violation.clone()),
        ),
        other => (
            format!("Policy violation: {other}"),
            fallback_location,
            Some(json!({ "raw_violation": other })),
        ),
    };

    let message = if message.is_empty() {
        format!("Policy violation {}", index + 1)
    } else {
        message
    };

    ValidationFailure {
        kind: kind.to_owned(),
        message,
        location,
        details,
    }
}

fn first_string(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_owned)
}

fn resource_action(fields: &Map<String, Value>) -> Option<String> {
    let resource = fields.get("resource")?.as_str()?;
    match fields.get("action").and_then(Value::as_str) {
        Some(action) => Some(format!("{resource}.{action}")),
        None => Some(resource.to_owned()),
    }
}
