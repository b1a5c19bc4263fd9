//! Blocking subprocess execution.
//!
//! [`SystemProcessRunner`] spawns the child with piped stdio, feeds any stdin
//! payload from a helper thread so a chatty child cannot deadlock against a
//! full pipe, and waits for exit. No timeout is enforced; callers that need
//! one wrap the whole plugin process in an external deadline.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::command::{CommandSpec, ProcessOutput};
use crate::error::ProcessError;

/// Tracing target for subprocess operations.
const PROCESS_TARGET: &str = "tbk_process::runner";

/// Trait abstracting subprocess execution for testability.
///
/// Implementations return `Ok` for every child that ran to completion,
/// whatever its exit status. `Err` is reserved for failures to start or talk
/// to the child.
pub trait ProcessRunner {
    /// Runs the described command to completion and captures its output.
    ///
    /// # Errors
    ///
    /// Returns a [`ProcessError`] if the child cannot be spawned or its
    /// standard streams cannot be serviced.
    fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError>;
}

impl<T> ProcessRunner for Arc<T>
where
    T: ProcessRunner + ?Sized,
{
    fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        (**self).run(command)
    }
}

impl<T> ProcessRunner for &T
where
    T: ProcessRunner + ?Sized,
{
    fn run(&self, command: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        (**self).run(command)
    }
}

/// Runs commands as real child processes of the plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        let program = spec.program().to_path_buf();
        let mut command = Command::new(spec.program());
        command.args(spec.arguments());
        if let Some(dir) = spec.working_dir() {
            command.current_dir(dir);
        }
        for (key, value) in spec.envs() {
            command.env(key, value);
        }
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.stdin(if spec.stdin_bytes().is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        debug!(
            target: PROCESS_TARGET,
            command = %spec,
            working_dir = ?spec.working_dir(),
            "spawning process"
        );

        let mut child = command.spawn().map_err(|err| ProcessError::Spawn {
            program: program.clone(),
            source: Arc::new(err),
        })?;

        let writer = match spec.stdin_bytes() {
            Some(payload) => {
                let mut stdin = child
                    .stdin
                    .take()
                    .ok_or_else(|| ProcessError::StdinUnavailable {
                        program: program.clone(),
                    })?;
                let payload = payload.to_vec();
                // Dropping stdin at the end of the closure closes the pipe.
                Some(thread::spawn(move || stdin.write_all(&payload)))
            }
            None => None,
        };

        let output = child.wait_with_output().map_err(|err| ProcessError::Io {
            program: program.clone(),
            source: Arc::new(err),
        })?;

        if let Some(handle) = writer {
            let written = handle.join().map_err(|_| ProcessError::StdinWriter {
                program: program.clone(),
            })?;
            // A child may legitimately exit before reading all of its input.
            if let Err(err) = written {
                debug!(
                    target: PROCESS_TARGET,
                    command = %spec,
                    error = %err,
                    "child closed stdin early"
                );
            }
        }

        let result = ProcessOutput::new(
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );

        debug!(
            target: PROCESS_TARGET,
            command = %spec,
            code = ?result.code(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "process exited"
        );

        Ok(result)
    }
}
