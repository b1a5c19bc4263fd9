//! Stage reporting.

mod annotator;
mod computed;
mod stage;

use std::sync::Arc;

use serde_json::Value;
use tbk_buildkite::Agent;
use tbk_config::OutputSpec;
use tbk_terraform::PlanDocument;
use tracing::{debug, info};

use crate::error::{AdapterError, OutputError};

pub use annotator::{BuildkiteAnnotator, DEFAULT_CONTEXT};
pub use computed::ComputedVars;
pub use stage::Stage;

/// Reports the outcome of one stage for one working directory.
pub trait Outputer {
    /// Emits the report.
    ///
    /// `plan` is present once a plan document has been shown. `data` is the
    /// auxiliary payload describing the working-directory result.
    ///
    /// # Errors
    ///
    /// Returns an [`OutputError`] when the report cannot be emitted.
    fn output(
        &self,
        plan: Option<&PlanDocument>,
        stage: Stage,
        data: &Value,
    ) -> Result<(), OutputError>;
}

impl<T> Outputer for Box<T>
where
    T: Outputer + ?Sized,
{
    fn output(
        &self,
        plan: Option<&PlanDocument>,
        stage: Stage,
        data: &Value,
    ) -> Result<(), OutputError> {
        (**self).output(plan, stage, data)
    }
}

impl<T> Outputer for Arc<T>
where
    T: Outputer + ?Sized,
{
    fn output(
        &self,
        plan: Option<&PlanDocument>,
        stage: Stage,
        data: &Value,
    ) -> Result<(), OutputError> {
        (**self).output(plan, stage, data)
    }
}

/// Builds one outputer per configured entry, in order.
///
/// # Errors
///
/// Returns [`AdapterError::UnknownOutput`] for an entry with no recognised
/// output, or [`AdapterError::InvalidComputedVar`] when a computed variable
/// regex does not compile.
pub fn to_outputers<A>(
    specs: &[OutputSpec],
    agent: &A,
) -> Result<Vec<Box<dyn Outputer>>, AdapterError>
where
    A: Agent + Clone + 'static,
{
    if specs.is_empty() {
        info!(target: "tbk_adapters::outputs", "no outputs defined");
        return Ok(Vec::new());
    }

    let mut outputers: Vec<Box<dyn Outputer>> = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let Some(annotation) = &spec.buildkite_annotation else {
            return Err(AdapterError::UnknownOutput { index });
        };
        debug!(target: "tbk_adapters::outputs", index, template = %annotation.template, "creating Buildkite annotator");
        outputers.push(Box::new(BuildkiteAnnotator::from_config(
            annotation,
            agent.clone(),
        )?));
    }
    info!(target: "tbk_adapters::outputs", count = outputers.len(), "outputers ready");
    Ok(outputers)
}
