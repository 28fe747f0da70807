//! Bind mounts exposing host directories to a container build.

use std::path::{Path, PathBuf};

use crate::consts::{CONTAINER_CACHE_DIR, CONTAINER_GOPATH_ROOT, CONTAINER_WORKDIR};

/// One host directory and where it appears inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
  pub local: PathBuf,
  pub target: String,
}

impl Mount {
  pub fn new(local: impl Into<PathBuf>, target: impl Into<String>) -> Self {
    Self {
      local: local.into(),
      target: target.into(),
    }
  }

  /// Value for the runtime's `-v` flag.
  pub fn volume_arg(&self) -> String {
    format!("{}:{}", self.local.display(), self.target)
  }
}

/// Mounts for a container build: the source directory, the cache directory
/// and one mount per module path entry, in module path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
  pub source: Mount,
  pub cache: Mount,
  pub module_paths: Vec<Mount>,
}

impl MountSpec {
  pub fn new(source_dir: &Path, cache_dir: &Path, module_paths: &[PathBuf]) -> Self {
    Self {
      source: Mount::new(source_dir, CONTAINER_WORKDIR),
      cache: Mount::new(cache_dir, CONTAINER_CACHE_DIR),
      module_paths: module_paths
        .iter()
        .enumerate()
        .map(|(index, local)| Mount::new(local, module_path_target(index)))
        .collect(),
    }
  }

  /// Container-side module path: the mount targets joined with `:`.
  pub fn container_module_path(&self) -> String {
    self
      .module_paths
      .iter()
      .map(|mount| mount.target.as_str())
      .collect::<Vec<_>>()
      .join(":")
  }

  /// All mounts, source and cache first.
  pub fn iter(&self) -> impl Iterator<Item = &Mount> {
    [&self.source, &self.cache].into_iter().chain(self.module_paths.iter())
  }
}

/// Container path for module path entry `index`. Zero-padded so targets are
/// unique and sort in entry order.
pub fn module_path_target(index: usize) -> String {
  format!("{}/gopath_{:03}", CONTAINER_GOPATH_ROOT, index)
}
