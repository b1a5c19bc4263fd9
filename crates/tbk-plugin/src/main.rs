//! Entry point of the Terraform Buildkite plugin binary.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    tbk_plugin::run(std::env::args_os(), &mut stdout, &mut stderr)
}
