//! `buildkite-agent` CLI adapter.

use std::path::Path;

use serde_json::Value;
use tbk_process::{CommandSpec, ProcessOutput, ProcessRunner};
use tracing::{debug, error};

use crate::error::AgentError;
use crate::render::render_template_file;
use crate::style::AnnotationStyle;

/// Executable name used when no explicit agent path is given.
pub const DEFAULT_AGENT_PROGRAM: &str = "buildkite-agent";

const AGENT_TARGET: &str = "tbk_buildkite::agent";

/// Presentation options for one annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Annotation style.
    pub style: AnnotationStyle,
    /// Context label; annotations sharing a context replace each other.
    pub context: String,
    /// Artifact to link from the annotation.
    pub artifact: Option<String>,
    /// Append to the existing annotation instead of replacing it.
    pub append: bool,
}

impl AnnotateOptions {
    /// Options with the given context and default style.
    #[must_use]
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..Self::default()
        }
    }

    /// Sets the style.
    #[must_use]
    pub const fn with_style(mut self, style: AnnotationStyle) -> Self {
        self.style = style;
        self
    }

    /// Enables append mode.
    #[must_use]
    pub const fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}

/// Operations the plugin performs through the Buildkite agent.
///
/// Each method returns the agent's standard output.
pub trait Agent {
    /// Creates or updates an annotation with `body`.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentError`] when the agent cannot run or fails.
    fn annotate(&self, body: &str, options: &AnnotateOptions) -> Result<String, AgentError>;

    /// Renders `template` with `data` and annotates with the result.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentError`] when rendering or annotating fails.
    fn annotate_with_template(
        &self,
        template: &Path,
        data: &Value,
        options: &AnnotateOptions,
    ) -> Result<String, AgentError>;

    /// Uploads a pipeline definition.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentError`] when the agent cannot run or fails.
    fn upload_pipeline(&self, pipeline: &Path) -> Result<String, AgentError>;
}

impl<T> Agent for std::sync::Arc<T>
where
    T: Agent + ?Sized,
{
    fn annotate(&self, body: &str, options: &AnnotateOptions) -> Result<String, AgentError> {
        (**self).annotate(body, options)
    }

    fn annotate_with_template(
        &self,
        template: &Path,
        data: &Value,
        options: &AnnotateOptions,
    ) -> Result<String, AgentError> {
        (**self).annotate_with_template(template, data, options)
    }

    fn upload_pipeline(&self, pipeline: &Path) -> Result<String, AgentError> {
        (**self).upload_pipeline(pipeline)
    }
}

/// Runs the `buildkite-agent` executable.
#[derive(Debug, Clone)]
pub struct BuildkiteAgent<R> {
    runner: R,
}

impl<R: ProcessRunner> BuildkiteAgent<R> {
    /// Creates an adapter running `buildkite-agent` from `PATH`.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }

    fn run(&self, subcommand: &'static str, args: Vec<String>) -> Result<String, AgentError> {
        let mut command = CommandSpec::new(DEFAULT_AGENT_PROGRAM);
        command.args(args);
        debug!(target: AGENT_TARGET, %command, "executing command");

        let output = self
            .runner
            .run(&command)
            .map_err(|source| AgentError::Process { subcommand, source })?;
        if output.success() {
            debug!(target: AGENT_TARGET, subcommand, stdout = output.stdout(), "command executed successfully");
            return Ok(output.stdout().to_owned());
        }

        error!(
            target: AGENT_TARGET,
            subcommand,
            code = ?output.code(),
            stderr = output.stderr(),
            "command execution failed"
        );
        Err(failure(subcommand, &output))
    }
}

fn failure(subcommand: &'static str, output: &ProcessOutput) -> AgentError {
    AgentError::CommandFailed {
        subcommand,
        status: output
            .code()
            .map_or_else(|| "signal".to_owned(), |code| code.to_string()),
        stderr: output.stderr().trim().to_owned(),
    }
}

impl<R: ProcessRunner> Agent for BuildkiteAgent<R> {
    fn annotate(&self, body: &str, options: &AnnotateOptions) -> Result<String, AgentError> {
        let mut args = vec![
            "annotate".to_owned(),
            body.to_owned(),
            "--style".to_owned(),
            options.style.to_string(),
            "--context".to_owned(),
            options.context.clone(),
        ];
        if let Some(artifact) = &options.artifact {
            args.push("--artifact".to_owned());
            args.push(artifact.clone());
        }
        if options.append {
            args.push("--append".to_owned());
        }
        self.run("annotate", args)
    }

    fn annotate_with_template(
        &self,
        template: &Path,
        data: &Value,
        options: &AnnotateOptions,
    ) -> Result<String, AgentError> {
        let body = render_template_file(template, data)?;
        self.annotate(&body, options)
    }

    fn upload_pipeline(&self, pipeline: &Path) -> Result<String, AgentError> {
        self.run(
            "pipeline upload",
            vec![
                "pipeline".to_owned(),
                "upload".to_owned(),
                pipeline.display().to_string(),
            ],
        )
    }
}
