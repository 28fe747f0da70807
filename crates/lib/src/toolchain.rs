//! Toolchain discovery.
//!
//! Finds the root directory and executable of the Go or TinyGo toolchain and
//! the module path (`GOPATH`) it searches. Every value is taken from the
//! captured host environment first and otherwise queried from the toolchain
//! itself with `<toolchain> env <VAR>`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::HostEnv;
use crate::consts::PATH_LIST_SEPARATOR;
use crate::error::{BuildError, Result};
use crate::util::process;

pub const GOROOT: &str = "GOROOT";
pub const TINYGOROOT: &str = "TINYGOROOT";
pub const GOPATH: &str = "GOPATH";

/// The compiler driving a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toolchain {
  /// The standard Go toolchain, targeting `js/wasm`.
  Go,
  /// TinyGo, targeting the restricted `wasm` profile.
  TinyGo,
}

impl Toolchain {
  /// Executable name, also used inside containers.
  pub fn binary_name(self) -> &'static str {
    match self {
      Self::Go => "go",
      Self::TinyGo => "tinygo",
    }
  }

  /// Environment variable holding the toolchain root.
  pub fn root_var(self) -> &'static str {
    match self {
      Self::Go => GOROOT,
      Self::TinyGo => TINYGOROOT,
    }
  }

  /// Root variables needed to run this toolchain. TinyGo depends on a Go
  /// installation, so it needs both.
  pub fn required_roots(self) -> &'static [Toolchain] {
    match self {
      Self::Go => &[Toolchain::Go],
      Self::TinyGo => &[Toolchain::TinyGo, Toolchain::Go],
    }
  }
}

impl fmt::Display for Toolchain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.binary_name())
  }
}

/// Everything needed to invoke a local toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainEnv {
  pub toolchain: Toolchain,
  /// Root variable name to resolved root directory.
  pub roots: BTreeMap<String, PathBuf>,
  /// Module path as one string, as the toolchain expects it.
  pub module_path: String,
  /// Module path split into its entries.
  pub module_paths: Vec<PathBuf>,
  pub executable: PathBuf,
}

/// Path of a toolchain's executable under its root.
pub fn executable_path(root: &Path, toolchain: Toolchain) -> PathBuf {
  root
    .join("bin")
    .join(format!("{}{}", toolchain.binary_name(), std::env::consts::EXE_SUFFIX))
}

/// Split a path list on the platform separator, dropping empty entries.
pub fn split_module_path(raw: &str) -> Vec<PathBuf> {
  split_path_list(raw, PATH_LIST_SEPARATOR)
}

pub fn split_path_list(raw: &str, separator: char) -> Vec<PathBuf> {
  raw
    .split(separator)
    .filter(|entry| !entry.is_empty())
    .map(PathBuf::from)
    .collect()
}

/// Resolves toolchains against a captured host environment.
#[derive(Debug, Clone)]
pub struct ToolchainResolver<'a> {
  env: &'a HostEnv,
  verbose: bool,
}

impl<'a> ToolchainResolver<'a> {
  pub fn new(env: &'a HostEnv) -> Self {
    Self { env, verbose: false }
  }

  pub fn verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }

  /// Resolve the roots, executable and module path for `toolchain`.
  ///
  /// Fails with [`BuildError::ToolchainNotFound`] when a root is neither set
  /// nor obtainable from the toolchain binary on `PATH`.
  pub async fn resolve(&self, toolchain: Toolchain) -> Result<ToolchainEnv> {
    let mut roots = BTreeMap::new();
    for required in toolchain.required_roots() {
      let root = self.resolve_root(*required).await?;
      roots.insert(required.root_var().to_string(), root);
    }

    let root = &roots[toolchain.root_var()];
    let executable = executable_path(root, toolchain);
    if tokio::fs::metadata(&executable).await.is_err() {
      return Err(BuildError::ToolchainNotFound {
        var: toolchain.root_var().to_string(),
        reason: format!("{} does not exist", executable.display()),
      });
    }

    let module_path = self.resolve_module_path(&executable).await?;
    let module_paths = split_module_path(&module_path);
    debug!(
      toolchain = %toolchain,
      executable = %executable.display(),
      module_path = %module_path,
      "resolved toolchain"
    );

    Ok(ToolchainEnv {
      toolchain,
      roots,
      module_path,
      module_paths,
      executable,
    })
  }

  async fn resolve_root(&self, toolchain: Toolchain) -> Result<PathBuf> {
    let var = toolchain.root_var();
    if let Some(root) = self.env.get(var) {
      return Ok(PathBuf::from(root));
    }

    let not_found = |reason: String| BuildError::ToolchainNotFound {
      var: var.to_string(),
      reason,
    };

    let binary = self
      .find_binary(toolchain.binary_name())
      .ok_or_else(|| not_found(format!("{} binary is not in PATH", toolchain.binary_name())))?;
    let root = self.introspect(&binary, var).await.map_err(not_found)?;
    if root.is_empty() {
      return Err(not_found(format!("`{} env {}` printed nothing", toolchain, var)));
    }
    Ok(PathBuf::from(root))
  }

  async fn resolve_module_path(&self, executable: &Path) -> Result<String> {
    if let Some(module_path) = self.env.get(GOPATH) {
      return Ok(module_path.to_string());
    }
    self
      .introspect(executable, GOPATH)
      .await
      .map_err(|reason| BuildError::ToolchainNotFound {
        var: GOPATH.to_string(),
        reason,
      })
  }

  /// Run `<binary> env <var>` and return its trimmed output.
  async fn introspect(&self, binary: &Path, var: &str) -> std::result::Result<String, String> {
    let args = vec!["env".to_string(), var.to_string()];
    let output = process::run(binary, &args, Some(self.env.vars()), None, self.verbose)
      .await
      .map_err(|e| format!("failed to run {}: {}", binary.display(), e))?;
    if !output.success() {
      return Err(format!(
        "`{} env {}` exited with {:?}: {}",
        binary.display(),
        var,
        output.code,
        output.stderr
      ));
    }
    Ok(output.stdout)
  }

  fn find_binary(&self, name: &str) -> Option<PathBuf> {
    let cwd = self.env.get("PWD").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    which::which_in(name, self.env.get("PATH"), cwd).ok()
  }
}
