//! Annotation styles.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Visual style of a Buildkite annotation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnnotationStyle {
    /// Green.
    Success,
    /// Blue; the agent's default.
    #[default]
    Info,
    /// Orange.
    Warning,
    /// Red.
    Error,
}
