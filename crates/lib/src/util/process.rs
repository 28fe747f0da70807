//! Subprocess execution.
//!
//! All toolchain and container runtime calls go through [`run`]. Arguments
//! are passed as a structured argv, never through a shell.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

/// Captured result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
  /// Exit code, `None` when the process was killed by a signal.
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl ProcessOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Run `program` with `args` and wait for it to exit.
///
/// When `env` is given the child environment is cleared and replaced by it.
/// Otherwise the child inherits the current environment. With `verbose` the
/// command line and its output are logged at `info` instead of `debug`.
///
/// Only a failure to spawn is an `Err`; a non-zero exit is reported through
/// [`ProcessOutput::code`].
pub async fn run(
  program: impl AsRef<OsStr>,
  args: &[String],
  env: Option<&BTreeMap<String, String>>,
  cwd: Option<&Path>,
  verbose: bool,
) -> io::Result<ProcessOutput> {
  let program = program.as_ref();
  let line = display_command(program, args);
  log_line(verbose, "cmd", &line);

  let mut command = Command::new(program);
  command
    .args(args)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

  if let Some(env) = env {
    command.env_clear().envs(env);
    log_line(verbose, "env", &format!("{:?}", env));
  }

  if let Some(cwd) = cwd {
    command.current_dir(cwd);
  }

  let output = command.output().await?;

  let result = ProcessOutput {
    code: output.status.code(),
    stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
  };

  if !result.stdout.is_empty() {
    log_line(verbose, "stdout", &result.stdout);
  }
  if !result.stderr.is_empty() {
    log_line(verbose, "stderr", &result.stderr);
  }

  Ok(result)
}

/// Render a command line for logs and error messages.
pub fn display_command(program: &OsStr, args: &[String]) -> String {
  let mut parts = vec![program.to_string_lossy().into_owned()];
  parts.extend(args.iter().cloned());
  parts.join(" ")
}

fn log_line(verbose: bool, stream: &str, text: &str) {
  if verbose {
    info!(stream, "{}", text);
  } else {
    debug!(stream, "{}", text);
  }
}
