//! Subprocess execution for the Terraform Buildkite plugin.
//!
//! Every external collaborator the plugin drives (`terraform`,
//! `buildkite-agent`, `opa`) is a short-lived child process. The
//! `tbk-process` crate describes such an invocation with a [`CommandSpec`],
//! runs it through a [`ProcessRunner`], and hands back the captured
//! [`ProcessOutput`]. Callers decide what a non-zero exit status means, since
//! for some tools (for example `terraform plan -detailed-exitcode`) the exit
//! code carries data rather than signalling failure.
//!
//! ```rust,no_run
//! use tbk_process::{CommandSpec, ProcessRunner, SystemProcessRunner};
//!
//! # fn main() -> Result<(), tbk_process::ProcessError> {
//! let mut command = CommandSpec::new("/bin/echo");
//! command.arg("hello from the plugin");
//!
//! let output = SystemProcessRunner.run(&command)?;
//! assert!(output.success());
//! assert_eq!(output.stdout(), "hello from the plugin\n");
//! # Ok(()) }
//! ```
//!
//! The [`ProcessRunner`] trait is the seam tests use to substitute recorded
//! responses for real processes.

mod command;
mod error;
mod lookup;
mod runner;

pub use command::{CommandSpec, ProcessOutput};
pub use error::ProcessError;
pub use lookup::{find_executable, require_file};
pub use runner::{ProcessRunner, SystemProcessRunner};
