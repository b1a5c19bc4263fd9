//! Validation and output adapters.
//!
//! Configuration names validators and outputs as data
//! ([`ValidationSpec`](tbk_config::ValidationSpec),
//! [`OutputSpec`](tbk_config::OutputSpec)). This crate turns that data into
//! behaviour: [`to_validators`] builds [`Validator`] values that judge a
//! Terraform plan, and [`to_outputers`] builds [`Outputer`] values that
//! report a stage of processing, currently as Buildkite annotations.
//!
//! Empty lists are valid: no validators means every plan passes, no
//! outputers means nothing is reported.

mod error;
pub mod outputs;
pub mod validators;

pub use error::{AdapterError, OutputError, PolicyError};
pub use outputs::{BuildkiteAnnotator, Outputer, Stage, to_outputers};
pub use validators::{
    OpaCli, OpaValidator, PolicyEvaluator, ValidationFailure, ValidationResult, Validator,
    to_validators,
};

#[cfg(test)]
mod tests;
