//! Error types for compiling a module.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a compile request.
///
/// Every variant is fatal for the request. None of them trigger a fallback to
/// the other backend.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The toolchain root could not be found in the environment or through
  /// the toolchain's own `env` subcommand.
  #[error("can't find the toolchain: {var} is not set and could not be queried ({reason})")]
  ToolchainNotFound { var: String, reason: String },

  /// Creating, reading or removing the cache directory failed.
  #[error("cache io error at {path}: {source}")]
  CacheIo {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The container image was missing locally and pulling it failed.
  #[error("failed to pull image {image}: {stderr}")]
  ImagePullFailed { image: String, stderr: String },

  /// The toolchain or container exited unsuccessfully, could not be
  /// started, or did not produce the artifact.
  #[error("build failed ({program}, exit code {code:?}): {stderr}")]
  BuildFailed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },

  /// Options were rejected at the boundary.
  #[error("invalid options: {0}")]
  InvalidOptions(String),
}

impl BuildError {
  pub(crate) fn cache_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    BuildError::CacheIo {
      path: path.into(),
      source,
    }
  }
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;
