//! Buildkite log group headers.
//!
//! Buildkite folds the job log at lines starting with `---` (collapsed) and
//! `+++` (expanded). `^^^ +++` re-opens the previous group, which is how
//! failures are surfaced.

use std::fmt::Display;
use std::io::{self, Write};

/// Writes log group headers to an injected sink.
#[derive(Debug)]
pub struct GroupWriter<W> {
    sink: W,
}

impl<W: Write> GroupWriter<W> {
    /// Wraps `sink`.
    #[must_use]
    pub const fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Starts an expanded group.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the sink.
    pub fn open(&mut self, title: impl Display) -> io::Result<()> {
        self.header("+++", title)
    }

    /// Starts a collapsed group.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the sink.
    pub fn closed(&mut self, title: impl Display) -> io::Result<()> {
        self.header("---", title)
    }

    /// Expands the group that is currently open.
    ///
    /// # Errors
    ///
    /// Propagates write failures from the sink.
    pub fn open_current(&mut self) -> io::Result<()> {
        writeln!(self.sink, "^^^ +++")
    }

    fn header(&mut self, marker: &str, title: impl Display) -> io::Result<()> {
        writeln!(self.sink, "{marker} {title}")
    }
}
