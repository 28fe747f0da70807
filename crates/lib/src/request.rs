//! Build requests and the context they run in.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::config::{Config, HostEnv};
use crate::consts::OUTPUT_FILE_NAME;
use crate::error::{BuildError, Result};
use crate::options::BuildOptions;
use crate::util::hash::RequestHash;

/// Receives non-fatal diagnostics, such as toolchain stderr from a build
/// that still succeeded.
pub trait WarningSink: Send + Sync {
  fn warn(&self, message: &str);
}

/// Sink that logs warnings through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
  fn warn(&self, message: &str) {
    warn!("{}", message);
  }
}

/// Session-wide state shared by every request: configuration, the captured
/// host environment and the warning sink. Set up once and only read after.
#[derive(Clone)]
pub struct BuildContext {
  pub config: Config,
  pub host: HostEnv,
  pub sink: Arc<dyn WarningSink>,
}

impl BuildContext {
  pub fn new(config: Config, host: HostEnv, sink: Arc<dyn WarningSink>) -> Self {
    Self { config, host, sink }
  }
}

impl std::fmt::Debug for BuildContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BuildContext")
      .field("config", &self.config)
      .field("host", &self.host)
      .finish_non_exhaustive()
  }
}

/// One compilation of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  pub source_path: PathBuf,
  /// Directory containing the source; the build's working directory.
  pub source_dir: PathBuf,
  /// Source file name relative to `source_dir`.
  pub source_file: String,
  pub hash: RequestHash,
  pub cache_dir: PathBuf,
  pub options: BuildOptions,
}

impl BuildRequest {
  pub fn new(source_path: &Path, hash: RequestHash, cache_dir: PathBuf, options: BuildOptions) -> Result<Self> {
    let source_file = source_path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .ok_or_else(|| BuildError::InvalidOptions(format!("{} does not name a file", source_path.display())))?;
    let source_dir = match source_path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    };

    Ok(Self {
      source_path: source_path.to_path_buf(),
      source_dir,
      source_file,
      hash,
      cache_dir,
      options,
    })
  }

  /// Where the toolchain writes the artifact on the host.
  pub fn output_path(&self) -> PathBuf {
    self.cache_dir.join(OUTPUT_FILE_NAME)
  }
}
