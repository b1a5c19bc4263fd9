//! Policy evaluation through the `opa` CLI.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tbk_process::{CommandSpec, ProcessRunner};
use tbk_terraform::lookup_path;
use tracing::{debug, info};

use crate::error::PolicyError;

const POLICY_TARGET: &str = "tbk_adapters::policy";

const OPA_PROGRAM: &str = "opa";

/// Evaluates a policy query against a JSON input and returns the raw
/// violations.
pub trait PolicyEvaluator {
    /// Evaluates the query against `input`.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] when the engine cannot produce a result.
    fn eval(&self, input: &Value) -> Result<Vec<Value>, PolicyError>;
}

/// `opa eval` output envelope.
#[derive(Debug, Default, Deserialize)]
struct EvalOutput {
    #[serde(default)]
    result: Vec<EvalResult>,
}

#[derive(Debug, Default, Deserialize)]
struct EvalResult {
    #[serde(default)]
    expressions: Vec<Expression>,
}

#[derive(Debug, Default, Deserialize)]
struct Expression {
    #[serde(default)]
    value: Value,
}

/// Runs `opa eval` against a bundle, feeding the input on stdin.
#[derive(Debug, Clone)]
pub struct OpaCli<R> {
    bundle: String,
    query: String,
    condition: Option<String>,
    runner: R,
}

impl<R: ProcessRunner> OpaCli<R> {
    /// Creates an evaluator for `query` over `bundle`.
    #[must_use]
    pub fn new(bundle: impl Into<String>, query: impl Into<String>, runner: R) -> Self {
        Self {
            bundle: bundle.into(),
            query: query.into(),
            condition: None,
            runner,
        }
    }

    /// Narrows each expression value with a dotted path before flattening.
    #[must_use]
    pub fn with_condition(mut self, condition: Option<String>) -> Self {
        self.condition = condition.filter(|condition| !condition.is_empty());
        self
    }
}

impl<R: ProcessRunner> PolicyEvaluator for OpaCli<R> {
    fn eval(&self, input: &Value) -> Result<Vec<Value>, PolicyError> {
        info!(
            target: POLICY_TARGET,
            bundle = %self.bundle,
            query = %self.query,
            condition = ?self.condition,
            "starting OPA policy evaluation"
        );
        let payload = serde_json::to_vec(input).map_err(|err| PolicyError::Input {
            source: Arc::new(err),
        })?;

        let mut command = CommandSpec::new(OPA_PROGRAM);
        command
            .args([
                "eval",
                "--format",
                "json",
                "--stdin-input",
                "--data",
                self.bundle.as_str(),
                self.query.as_str(),
            ])
            .stdin(payload);

        let output = self
            .runner
            .run(&command)
            .map_err(|source| PolicyError::Process {
                query: self.query.clone(),
                source,
            })?;
        if !output.success() {
            return Err(PolicyError::Evaluation {
                query: self.query.clone(),
                status: output
                    .code()
                    .map_or_else(|| "signal".to_owned(), |code| code.to_string()),
                stderr: output.stderr().trim().to_owned(),
            });
        }

        let parsed: EvalOutput =
            serde_json::from_str(output.stdout()).map_err(|err| PolicyError::InvalidOutput {
                query: self.query.clone(),
                source: Arc::new(err),
            })?;
        let violations: Vec<Value> = parsed
            .result
            .iter()
            .flat_map(|result| &result.expressions)
            .flat_map(|expression| filter_result(&expression.value, self.condition.as_deref()))
            .collect();

        info!(
            target: POLICY_TARGET,
            query = %self.query,
            violations = violations.len(),
            "OPA policy evaluation completed"
        );
        Ok(violations)
    }
}

/// Flattens one expression value into individual violations.
///
/// With a `condition`, the value is first narrowed to that dotted path and a
/// missing path yields nothing. Arrays contribute one violation per element;
/// any other value is a single violation. `null` never counts.
///
/// ```
/// use serde_json::json;
/// use tbk_adapters::validators::filter_result;
///
/// let value = json!({"deny": ["no tags", "public bucket"]});
/// assert_eq!(filter_result(&value, Some("deny")).len(), 2);
/// assert!(filter_result(&value, Some("warn")).is_empty());
/// ```
#[must_use]
pub fn filter_result(value: &Value, condition: Option<&str>) -> Vec<Value> {
    let selected = match condition.filter(|condition| !condition.is_empty()) {
        Some(condition) => {
            let Some(selected) = lookup_path(value, condition) else {
                debug!(target: POLICY_TARGET, condition, "condition path not found in result");
                return Vec::new();
            };
            selected
        }
        None => value,
    };

    match selected {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter(|item| !item.is_null()).cloned().collect(),
        other => vec![other.clone()],
    }
}
