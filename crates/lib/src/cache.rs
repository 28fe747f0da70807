//! Per-request cache directories.
//!
//! Each request gets `<cache root>/<prefix>-<hash>`. The directory holds the
//! toolchain's build cache and the produced artifact, and survives between
//! builds unless the request asks for it to be cleared.
//!
//! Requests that hash to the same directory are serialized: a [`CacheLease`]
//! holds a per-hash lock from acquisition until release.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::{BuildError, Result};
use crate::util::hash::RequestHash;

/// Creates, locks and clears cache directories under one root.
#[derive(Debug)]
pub struct CacheManager {
  root: PathBuf,
  prefix: String,
  locks: Mutex<HashMap<RequestHash, Arc<AsyncMutex<()>>>>,
}

impl CacheManager {
  pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      prefix: prefix.into(),
      locks: Mutex::new(HashMap::new()),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Directory for `hash`. Does not touch the filesystem.
  pub fn dir_for(&self, hash: &RequestHash) -> PathBuf {
    self.root.join(format!("{}-{}", self.prefix, hash))
  }

  /// Return the directory for `hash`, creating it and its parents if needed.
  pub async fn acquire(&self, hash: &RequestHash) -> Result<PathBuf> {
    let dir = self.dir_for(hash);
    tokio::fs::create_dir_all(&dir)
      .await
      .map_err(|e| BuildError::cache_io(&dir, e))?;
    Ok(dir)
  }

  /// Remove `path` recursively. An absent path is not an error.
  pub async fn clear(&self, path: &Path) -> Result<()> {
    clear_dir(path).await
  }

  /// Lock the directory for `hash` and make it ready for a build.
  ///
  /// With `clear_cache` the directory is removed before it is created, and
  /// again when the lease is released.
  pub async fn lease(&self, hash: &RequestHash, clear_cache: bool) -> Result<CacheLease> {
    let lock = self.lock_for(hash);
    let guard = lock.lock_owned().await;

    let dir = self.dir_for(hash);
    if clear_cache {
      debug!(path = %dir.display(), "clearing cache before build");
      self.clear(&dir).await?;
    }
    let dir = self.acquire(hash).await?;

    Ok(CacheLease {
      dir,
      clear_cache,
      released: false,
      _guard: guard,
    })
  }

  fn lock_for(&self, hash: &RequestHash) -> Arc<AsyncMutex<()>> {
    let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // Drop entries nobody is holding or waiting on.
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    locks.entry(hash.clone()).or_default().clone()
  }
}

async fn clear_dir(path: &Path) -> Result<()> {
  match tokio::fs::remove_dir_all(path).await {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(BuildError::cache_io(path, e)),
  }
}

/// Exclusive use of one cache directory for the duration of a build.
///
/// A lease dropped without [`CacheLease::release`], because the build future
/// was abandoned or a panic unwound through it, still clears the directory
/// when asked to, before the lock is given up.
#[derive(Debug)]
pub struct CacheLease {
  dir: PathBuf,
  clear_cache: bool,
  released: bool,
  _guard: OwnedMutexGuard<()>,
}

impl CacheLease {
  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Clear the directory if requested, then give up the lock.
  ///
  /// Failures are logged and swallowed so they never replace the build's
  /// own result.
  pub async fn release(mut self) {
    if self.clear_cache {
      debug!(path = %self.dir.display(), "clearing cache after build");
      if let Err(e) = clear_dir(&self.dir).await {
        warn!(path = %self.dir.display(), error = %e, "failed to clear cache directory");
      }
    }
    self.released = true;
  }
}

impl Drop for CacheLease {
  fn drop(&mut self) {
    if self.released || !self.clear_cache {
      return;
    }
    debug!(path = %self.dir.display(), "clearing cache of an abandoned build");
    match std::fs::remove_dir_all(&self.dir) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => warn!(path = %self.dir.display(), error = %e, "failed to clear cache directory"),
    }
  }
}
