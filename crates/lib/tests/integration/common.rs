//! Shared helpers for compile tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gowasm_lib::{Compiler, Config, HostEnv, TracingSink};
use tempfile::TempDir;

/// Isolated workspace: a source directory, a cache root and room for fake
/// executables.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    std::fs::create_dir_all(env.src_dir()).unwrap();
    env
  }

  pub fn src_dir(&self) -> PathBuf {
    self.temp.path().join("src")
  }

  pub fn source(&self) -> PathBuf {
    let path = self.src_dir().join("main.go");
    std::fs::write(&path, "package main\n\nfunc main() {}\n").unwrap();
    path
  }

  pub fn cache_root(&self) -> PathBuf {
    self.temp.path().join("cache")
  }

  pub fn log_path(&self) -> PathBuf {
    self.temp.path().join("calls.log")
  }

  pub fn log(&self) -> Vec<String> {
    std::fs::read_to_string(self.log_path())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  pub fn config(&self) -> Config {
    Config {
      cache_root: self.cache_root(),
      ..Config::default()
    }
  }

  pub fn compiler(&self, config: Config, host: HostEnv) -> Compiler {
    Compiler::new(config, host, Arc::new(TracingSink))
  }

  /// A `go` toolchain root whose build runs `build_body` with `$out` set to
  /// the `-o` argument.
  pub fn go_root(&self, build_body: &str) -> PathBuf {
    let root = self.temp.path().join("go");
    let body = format!(
      r#"if [ "$1" = "env" ]; then echo "/gopath"; exit 0; fi
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
{}"#,
      build_body
    );
    write_script(&root.join("bin"), "go", &body);
    root
  }
}

pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  std::fs::create_dir_all(dir).unwrap();
  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}
