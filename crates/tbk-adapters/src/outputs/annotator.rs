//! Buildkite annotation output.

use std::path::PathBuf;

use serde_json::{Map, Value};
use tbk_buildkite::{Agent, AnnotateOptions};
use tbk_config::AnnotationOutput;
use tbk_terraform::PlanDocument;
use tracing::info;

use super::computed::ComputedVars;
use super::stage::Stage;
use super::Outputer;
use crate::error::{AdapterError, OutputError};

/// Context label used when the configuration leaves it empty.
pub const DEFAULT_CONTEXT: &str = "terraform";

/// Renders a template per stage and posts it as a Buildkite annotation.
///
/// Each working directory annotates under its own context,
/// `<context>-<working_dir>`, so one directory never replaces another's
/// annotation. Within a directory a later stage replaces the earlier one.
#[derive(Debug, Clone)]
pub struct BuildkiteAnnotator<A> {
    template: PathBuf,
    context: String,
    vars: Map<String, Value>,
    computed: ComputedVars,
    agent: A,
}

impl<A: Agent> BuildkiteAnnotator<A> {
    /// Builds an annotator from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidComputedVar`] when a computed variable
    /// regex does not compile.
    pub fn from_config(config: &AnnotationOutput, agent: A) -> Result<Self, AdapterError> {
        let context = if config.context.is_empty() {
            DEFAULT_CONTEXT.to_owned()
        } else {
            config.context.clone()
        };
        let vars = config
            .vars
            .iter()
            .flatten()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        Ok(Self {
            template: PathBuf::from(&config.template),
            context,
            vars,
            computed: ComputedVars::compile(&config.computed_vars)?,
            agent,
        })
    }

    /// Annotation context label.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Context for the directory named by `data["working_dir"]`.
    ///
    /// Falls back to the bare context when `data` names no directory.
    #[must_use]
    pub fn directory_context(&self, data: &Value) -> String {
        match data.get("working_dir").and_then(Value::as_str) {
            Some(dir) if !dir.is_empty() => format!("{}-{dir}", self.context),
            _ => self.context.clone(),
        }
    }

    /// Builds the value the template is rendered with.
    #[must_use]
    pub fn template_data(&self, plan: Option<&PlanDocument>, stage: Stage, data: &Value) -> Value {
        let mut root = Map::new();
        if let Value::Object(fields) = data {
            root.extend(fields.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        root.insert("stage".to_owned(), Value::String(stage.to_string()));
        root.insert("vars".to_owned(), Value::Object(self.vars.clone()));
        root.insert(
            "computed".to_owned(),
            Value::Object(self.computed.resolve(plan)),
        );
        root.insert(
            "resource_changes".to_owned(),
            Value::from(plan.map_or(0, |plan| plan.resource_changes().len())),
        );
        root.insert("data".to_owned(), data.clone());
        Value::Object(root)
    }
}

impl<A: Agent> Outputer for BuildkiteAnnotator<A> {
    fn output(
        &self,
        plan: Option<&PlanDocument>,
        stage: Stage,
        data: &Value,
    ) -> Result<(), OutputError> {
        let context = self.directory_context(data);
        let options = AnnotateOptions::new(context.as_str())
            .with_style(stage.annotation_style())
            .with_append(false);
        let template_data = self.template_data(plan, stage, data);
        self.agent
            .annotate_with_template(&self.template, &template_data, &options)
            .map_err(|source| OutputError::Annotation { source })?;
        info!(
            target: "tbk_adapters::annotator",
            %stage,
            %context,
            "annotation posted"
        );
        Ok(())
    }
}
