//! Buildkite agent integration.
//!
//! Annotations and pipeline uploads go through the `buildkite-agent` CLI
//! ([`BuildkiteAgent`]). Annotation bodies can be rendered from Handlebars
//! templates ([`render_template`]). Log group headers for the job log are
//! written by [`GroupWriter`] to whatever sink it is given.

mod agent;
mod error;
mod group;
mod render;
mod style;

pub use agent::{Agent, AnnotateOptions, BuildkiteAgent, DEFAULT_AGENT_PROGRAM};
pub use error::AgentError;
pub use group::GroupWriter;
pub use render::{render_template, render_template_file};
pub use style::AnnotationStyle;
