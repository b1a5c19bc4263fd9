//! Annotation template rendering.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use handlebars::{Handlebars, RenderError};
use serde::Serialize;
use tracing::info;

use crate::error::AgentError;

fn registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    // Annotation bodies are Markdown; HTML escaping would mangle them.
    registry.register_escape_fn(handlebars::no_escape);
    registry.set_strict_mode(false);
    registry
}

/// Renders a Handlebars template string.
///
/// Missing fields render as empty strings and output is not HTML-escaped.
///
/// # Errors
///
/// Returns the Handlebars error when the template does not parse or a helper
/// fails.
pub fn render_template(template: &str, data: &impl Serialize) -> Result<String, RenderError> {
    registry().render_template(template, data)
}

/// Reads and renders the template at `path`.
///
/// # Errors
///
/// Returns [`AgentError::TemplateRead`] or [`AgentError::TemplateRender`].
pub fn render_template_file(path: &Path, data: &impl Serialize) -> Result<String, AgentError> {
    info!(target: "tbk_buildkite::render", template = %path.display(), "rendering template");
    let template = fs::read_to_string(path).map_err(|source| AgentError::TemplateRead {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })?;
    render_template(&template, data).map_err(|source| AgentError::TemplateRender {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })
}
