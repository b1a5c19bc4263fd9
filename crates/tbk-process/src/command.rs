//! Invocation description and captured output types.

use std::fmt;
use std::path::{Path, PathBuf};

/// Describes one subprocess invocation.
///
/// The description is plain data so it can be recorded and compared in
/// tests; nothing is spawned until it is handed to a
/// [`ProcessRunner`](crate::ProcessRunner).
///
/// # Example
///
/// ```
/// use tbk_process::CommandSpec;
///
/// let mut command = CommandSpec::new("terraform");
/// command.arg("init").arg("-input=false").current_dir("/work/app");
///
/// assert_eq!(command.arguments(), ["init", "-input=false"]);
/// assert_eq!(command.to_string(), "terraform init -input=false");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    stdin: Option<Vec<u8>>,
}

impl CommandSpec {
    /// Creates a description for the given program with no arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Appends one argument.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory of the child.
    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable on top of the inherited environment.
    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Supplies bytes to be written to the child's stdin.
    pub fn stdin(&mut self, input: impl Into<Vec<u8>>) -> &mut Self {
        self.stdin = Some(input.into());
        self
    }

    /// Returns the program path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the arguments.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Returns the working directory, if one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Returns the extra environment variables.
    #[must_use]
    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// Returns the stdin payload, if any.
    #[must_use]
    pub fn stdin_bytes(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output captured from a finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl ProcessOutput {
    /// Creates an output record. Mostly useful for test doubles.
    #[must_use]
    pub fn new(code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Shorthand for a zero exit status with the given stdout.
    #[must_use]
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self::new(Some(0), stdout, String::new())
    }

    /// Shorthand for an exit status with the given stderr.
    #[must_use]
    pub fn exited(code: i32, stderr: impl Into<String>) -> Self {
        Self::new(Some(code), String::new(), stderr)
    }

    /// Exit code, or `None` when the child was terminated by a signal.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        self.code
    }

    /// Returns `true` when the child exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }

    /// Captured standard output.
    #[must_use]
    pub const fn stdout(&self) -> &str {
        self.stdout.as_str()
    }

    /// Captured standard error.
    #[must_use]
    pub const fn stderr(&self) -> &str {
        self.stderr.as_str()
    }
}
