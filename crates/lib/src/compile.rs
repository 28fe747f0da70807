//! Compilation entry point.
//!
//! [`Compiler::compile`] is what a host calls: it derives the request's
//! cache directory, holds it for the duration of the build, picks the
//! backend and hands back the artifact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::backend::{BackendKind, compile_with};
use crate::cache::CacheManager;
use crate::config::{Config, HostEnv};
use crate::error::Result;
use crate::options::BuildOptions;
use crate::request::{BuildContext, BuildRequest, TracingSink, WarningSink};
use crate::util::hash::RequestHash;

/// Compiles Go sources to WebAssembly for one host session.
#[derive(Debug)]
pub struct Compiler {
  ctx: BuildContext,
  cache: CacheManager,
}

impl Compiler {
  pub fn new(config: Config, host: HostEnv, sink: Arc<dyn WarningSink>) -> Self {
    let cache = CacheManager::new(config.cache_root.clone(), config.cache_prefix.clone());
    Self {
      ctx: BuildContext::new(config, host, sink),
      cache,
    }
  }

  /// Compiler configured from the current process environment, logging
  /// warnings through `tracing`.
  pub fn from_env() -> Self {
    let host = HostEnv::capture();
    Self::new(Config::from_env(&host), host, Arc::new(TracingSink))
  }

  pub fn config(&self) -> &Config {
    &self.ctx.config
  }

  pub fn host(&self) -> &HostEnv {
    &self.ctx.host
  }

  pub fn cache(&self) -> &CacheManager {
    &self.cache
  }

  /// Cache directory a build of `resource_path` uses.
  pub fn cache_dir_for(&self, resource_path: &Path) -> PathBuf {
    self.cache.dir_for(&RequestHash::from_path(resource_path))
  }

  /// Compile `resource_path` and return the module bytes.
  ///
  /// With `clear_cache` the cache directory is removed before the build and
  /// again afterwards, whether or not the build succeeded. The backend's
  /// error is returned unchanged.
  pub async fn compile(&self, resource_path: &Path, options: &BuildOptions) -> Result<Vec<u8>> {
    let hash = RequestHash::from_path(resource_path);
    let request = BuildRequest::new(resource_path, hash.clone(), self.cache.dir_for(&hash), options.clone())?;

    info!(
      source = %resource_path.display(),
      hash = %hash,
      backend = ?BackendKind::for_options(options),
      "compiling"
    );

    let lease = self.cache.lease(&hash, options.clear_cache).await?;
    let result = compile_with(&self.ctx, &request).await;
    lease.release().await;

    match &result {
      Ok(bytes) => info!(source = %resource_path.display(), bytes = bytes.len(), "compiled"),
      Err(e) => error!(source = %resource_path.display(), error = %e, "compile failed"),
    }
    result
  }
}
