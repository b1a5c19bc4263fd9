//! Stages reported to outputers.

use serde::Serialize;
use strum::{Display, EnumString};
use tbk_buildkite::AnnotationStyle;

/// Point in a working directory's run at which outputs are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Init, plan or show failed.
    PlanFailure,
    /// Apply failed.
    ApplyFailure,
    /// A validator failed or rejected the plan.
    ValidationFailure,
    /// Something outside the terraform lifecycle failed.
    UnexpectedFailure,
    /// The plan contained no changes.
    PlanSuccessNoChanges,
    /// The plan contained changes and passed validation.
    PlanSuccessWithChanges,
    /// Every validator accepted the plan.
    ValidationSuccess,
    /// The plan was applied.
    ApplySuccess,
}

impl Stage {
    /// Annotation style used when reporting this stage.
    #[must_use]
    pub const fn annotation_style(self) -> AnnotationStyle {
        match self {
            Self::PlanFailure | Self::ApplyFailure | Self::ValidationFailure | Self::UnexpectedFailure => {
                AnnotationStyle::Error
            }
            Self::PlanSuccessWithChanges | Self::ValidationSuccess | Self::ApplySuccess => {
                AnnotationStyle::Success
            }
            Self::PlanSuccessNoChanges => AnnotationStyle::Info,
        }
    }
}
