//! Process-wide configuration.
//!
//! [`Config`] is built once per host session and read by every request.
//! Values come from the constants in [`crate::consts`], optionally overridden
//! by `GOWASM_*` environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::consts::{
  CACHE_DIR_PREFIX, CONTAINER_NAME_PREFIX, DEFAULT_CONTAINER_RUNTIME, DEFAULT_IMAGE_GO, DEFAULT_IMAGE_TINYGO,
};
use crate::options::BuildOptions;
use crate::toolchain::Toolchain;

/// Overrides the container runtime program (`docker`, `podman`, ...).
pub const RUNTIME_ENV: &str = "GOWASM_RUNTIME";
pub const IMAGE_GO_ENV: &str = "GOWASM_IMAGE_GO";
pub const IMAGE_TINYGO_ENV: &str = "GOWASM_IMAGE_TINYGO";
/// Overrides the directory cache directories are created under.
pub const CACHE_ROOT_ENV: &str = "GOWASM_CACHE_ROOT";

/// Snapshot of the environment of the host process.
///
/// Captured once and handed to the resolver and backends. Every subprocess a
/// build starts gets its environment from this snapshot, never from the live
/// process environment. Empty values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
  vars: BTreeMap<String, String>,
}

impl HostEnv {
  /// Capture the current process environment.
  pub fn capture() -> Self {
    Self::from_vars(
      std::env::vars_os().map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned())),
    )
  }

  pub fn from_vars<I, K, V>(vars: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    HostEnv {
      vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }

  pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.vars.insert(key.into(), value.into());
    self
  }

  /// All captured variables, as passed to introspection and runtime calls.
  pub fn vars(&self) -> &BTreeMap<String, String> {
    &self.vars
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.vars.get(key).map(String::as_str).filter(|v| !v.is_empty())
  }
}

/// Configuration shared by all requests of a host session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Container runtime program, resolved on `PATH`.
  pub runtime: String,
  pub image_go: String,
  pub image_tinygo: String,
  /// Prefix of container names; the request hash is appended.
  pub container_prefix: String,
  /// Directory cache directories are created under.
  pub cache_root: PathBuf,
  pub cache_prefix: String,
  /// Options used for every key a request leaves unset.
  pub defaults: BuildOptions,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      runtime: DEFAULT_CONTAINER_RUNTIME.to_string(),
      image_go: DEFAULT_IMAGE_GO.to_string(),
      image_tinygo: DEFAULT_IMAGE_TINYGO.to_string(),
      container_prefix: CONTAINER_NAME_PREFIX.to_string(),
      cache_root: std::env::temp_dir(),
      cache_prefix: CACHE_DIR_PREFIX.to_string(),
      defaults: BuildOptions::default(),
    }
  }
}

impl Config {
  /// Defaults with `GOWASM_*` overrides from `env` applied.
  pub fn from_env(env: &HostEnv) -> Self {
    let mut config = Self::default();
    if let Some(runtime) = env.get(RUNTIME_ENV) {
      config.runtime = runtime.to_string();
    }
    if let Some(image) = env.get(IMAGE_GO_ENV) {
      config.image_go = image.to_string();
    }
    if let Some(image) = env.get(IMAGE_TINYGO_ENV) {
      config.image_tinygo = image.to_string();
    }
    if let Some(root) = env.get(CACHE_ROOT_ENV) {
      // Relative roots are pinned to the current directory so container
      // mounts and host reads agree on the location.
      config.cache_root = std::path::absolute(root).unwrap_or_else(|_| PathBuf::from(root));
    }
    config
  }

  /// Built-in image for a toolchain, without tag.
  pub fn default_image(&self, toolchain: Toolchain) -> &str {
    match toolchain {
      Toolchain::Go => &self.image_go,
      Toolchain::TinyGo => &self.image_tinygo,
    }
  }
}
