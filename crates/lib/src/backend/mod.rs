//! Build backends.
//!
//! A backend turns a [`BuildRequest`] into the bytes of a WebAssembly
//! module. [`LocalBackend`] runs an installed toolchain, [`ContainerBackend`]
//! runs one inside a container. Both write the artifact into the request's
//! cache directory and read it back from there.

pub mod container;
pub mod local;

use std::future::Future;
use std::io;
use std::path::Path;

use crate::error::{BuildError, Result};
use crate::options::BuildOptions;
use crate::request::{BuildContext, BuildRequest};
use crate::util::process::ProcessOutput;

pub use container::ContainerBackend;
pub use local::LocalBackend;

/// A strategy for compiling a request.
pub trait CompileBackend {
  fn compile(&self, request: &BuildRequest) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Which backend a request runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
  Local,
  Container,
}

impl BackendKind {
  pub fn for_options(options: &BuildOptions) -> Self {
    if options.docker { Self::Container } else { Self::Local }
  }
}

/// Compile `request` on the backend its options select.
pub async fn compile_with(ctx: &BuildContext, request: &BuildRequest) -> Result<Vec<u8>> {
  match BackendKind::for_options(&request.options) {
    BackendKind::Local => LocalBackend::new(ctx).compile(request).await,
    BackendKind::Container => ContainerBackend::new(ctx).compile(request).await,
  }
}

/// Turn a finished build process into `Ok` or [`BuildError::BuildFailed`].
///
/// Stderr of a successful build is handed to the warning sink.
pub(crate) fn check_build(ctx: &BuildContext, program: &str, output: ProcessOutput) -> Result<()> {
  if !output.success() {
    let stderr = if output.stderr.is_empty() {
      output.stdout
    } else {
      output.stderr
    };
    return Err(BuildError::BuildFailed {
      program: program.to_string(),
      code: output.code,
      stderr,
    });
  }
  if !output.stderr.is_empty() {
    ctx.sink.warn(&output.stderr);
  }
  Ok(())
}

pub(crate) fn spawn_failed(program: &str, err: io::Error) -> BuildError {
  BuildError::BuildFailed {
    program: program.to_string(),
    code: None,
    stderr: format!("failed to start: {}", err),
  }
}

/// Read the artifact a successful build left at `path`.
pub(crate) async fn read_artifact(path: &Path, program: &str) -> Result<Vec<u8>> {
  match tokio::fs::read(path).await {
    Ok(bytes) => Ok(bytes),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BuildError::BuildFailed {
      program: program.to_string(),
      code: Some(0),
      stderr: format!("build succeeded but produced no output at {}", path.display()),
    }),
    Err(e) => Err(BuildError::cache_io(path, e)),
  }
}
