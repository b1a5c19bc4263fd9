//! Validator outcomes.

use serde::Serialize;
use serde_json::Value;

/// Outcome of one validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// Whether the plan passed.
    pub passed: bool,
    /// Individual objections, in the order they were reported.
    pub failures: Vec<ValidationFailure>,
}

impl ValidationResult {
    /// A passing result with no failures.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            failures: Vec::new(),
        }
    }

    /// A result that passes exactly when `failures` is empty.
    #[must_use]
    pub fn from_failures(failures: Vec<ValidationFailure>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }
}

/// One objection raised against a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    /// Category of the failure, e.g. the policy query that produced it.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
    /// What the failure refers to: a resource address, attribute path, or
    /// `violation[i]`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub location: String,
    /// Structured detail from the policy engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
