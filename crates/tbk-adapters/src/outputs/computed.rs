//! Template variables extracted from the plan document.

use regex::Regex;
use serde_json::{Map, Value};
use tbk_config::ComputedVar;
use tbk_terraform::PlanDocument;
use tracing::debug;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
struct Compiled {
    name: String,
    from: String,
    regex: Regex,
}

/// Compiled computed-variable rules.
#[derive(Debug, Clone, Default)]
pub struct ComputedVars {
    rules: Vec<Compiled>,
}

impl ComputedVars {
    /// Compiles every rule's regex.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidComputedVar`] for the first regex that
    /// fails to compile.
    pub fn compile(vars: &[ComputedVar]) -> Result<Self, AdapterError> {
        let rules = vars
            .iter()
            .map(|var| {
                Regex::new(&var.regex)
                    .map(|regex| Compiled {
                        name: var.name.clone(),
                        from: var.from.clone(),
                        regex,
                    })
                    .map_err(|source| AdapterError::InvalidComputedVar {
                        name: var.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Resolves every rule against `plan`.
    ///
    /// A rule whose path is missing, whose value is not a scalar, or whose
    /// regex does not match is left out. The first capture group is used
    /// when the regex has one, otherwise the whole match.
    #[must_use]
    pub fn resolve(&self, plan: Option<&PlanDocument>) -> Map<String, Value> {
        let Some(plan) = plan else {
            return Map::new();
        };
        self.rules
            .iter()
            .filter_map(|rule| {
                let resolved = resolve_one(rule, plan);
                if resolved.is_none() {
                    debug!(target: "tbk_adapters::computed", name = %rule.name, from = %rule.from, "computed variable unresolved");
                }
                resolved.map(|value| (rule.name.clone(), Value::String(value)))
            })
            .collect()
    }
}

fn resolve_one(rule: &Compiled, plan: &PlanDocument) -> Option<String> {
    let text = scalar_text(plan.lookup(&rule.from)?)?;
    let captures = rule.regex.captures(&text)?;
    let matched = captures.get(1).or_else(|| captures.get(0))?;
    Some(matched.as_str().to_owned())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
