//! Stage transition hooks.

use camino::Utf8Path;
use serde_json::{Value, json};
use tbk_adapters::{Outputer, Stage, ValidationFailure};
use tbk_terraform::PlanDocument;
use tracing::{debug, warn};

use super::result::WorkspaceResult;

/// One stage transition for one working directory.
#[derive(Debug, Clone, Copy)]
pub struct StageEvent<'a> {
    /// Stage reached.
    pub stage: Stage,
    /// Directory being processed.
    pub working_dir: &'a Utf8Path,
    /// Plan document, once it has been shown.
    pub plan: Option<&'a PlanDocument>,
    /// Result at this point.
    pub result: &'a WorkspaceResult,
    /// Failures reported by validators, if any.
    pub failures: &'a [ValidationFailure],
}

impl StageEvent<'_> {
    /// Auxiliary data handed to outputers.
    #[must_use]
    pub fn data(&self) -> Value {
        json!({
            "working_dir": self.working_dir,
            "success": self.result.success,
            "result_stage": self.result.stage,
            "error": self.result.error,
            "failures": self.failures,
        })
    }
}

/// Receives stage transitions from the orchestrator.
pub trait StageObserver {
    /// Called at every reported transition.
    fn on_stage(&self, event: &StageEvent<'_>);
}

impl<T> StageObserver for &T
where
    T: StageObserver + ?Sized,
{
    fn on_stage(&self, event: &StageEvent<'_>) {
        (**self).on_stage(event);
    }
}

/// Ignores every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&self, _event: &StageEvent<'_>) {}
}

/// Forwards every transition to the configured outputers.
///
/// Outputer failures are logged and otherwise ignored.
#[derive(Default)]
pub struct OutputObserver {
    outputers: Vec<Box<dyn Outputer>>,
}

impl OutputObserver {
    /// Wraps `outputers`.
    #[must_use]
    pub fn new(outputers: Vec<Box<dyn Outputer>>) -> Self {
        Self { outputers }
    }
}

impl std::fmt::Debug for OutputObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputObserver")
            .field("outputers", &self.outputers.len())
            .finish()
    }
}

impl StageObserver for OutputObserver {
    fn on_stage(&self, event: &StageEvent<'_>) {
        if self.outputers.is_empty() {
            return;
        }
        let data = event.data();
        for (index, outputer) in self.outputers.iter().enumerate() {
            debug!(target: "tbk_plugin::observer", index, stage = %event.stage, "emitting output");
            if let Err(err) = outputer.output(event.plan, event.stage, &data) {
                warn!(
                    target: "tbk_plugin::observer",
                    index,
                    stage = %event.stage,
                    working_dir = %event.working_dir,
                    error = %err,
                    "output failed"
                );
            }
        }
    }
}
