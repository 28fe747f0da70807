//! Test utilities for gowasm-lib.
//!
//! Cross-platform helpers for tests that run shell commands, plus writers for
//! fake toolchain executables.

use std::path::{Path, PathBuf};

/// Returns the shell command and args to echo an environment variable.
#[cfg(unix)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), format!("echo \"${}\"", var)])
}

#[cfg(windows)]
pub fn shell_echo_env(var: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo %{}%", var)])
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Write an executable `/bin/sh` script named `name` into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  std::fs::create_dir_all(dir).unwrap();
  let path = dir.join(name);
  std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Lay out a fake toolchain root whose `bin/<name>` answers `env GOPATH`
/// with `gopath` and whose `build` writes `payload` plus the target
/// environment into the `-o` path.
#[cfg(unix)]
pub fn fake_toolchain(root: &Path, name: &str, gopath: &str, payload: &str) -> PathBuf {
  let body = format!(
    r#"if [ "$1" = "env" ]; then
  case "$2" in
    GOPATH) echo "{gopath}" ;;
    *) echo "{root}" ;;
  esac
  exit 0
fi
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
echo "warning: fake toolchain" 1>&2
printf '%s|%s|%s|%s' "{payload}" "$GOOS" "$GOARCH" "$*" > "$out""#,
    gopath = gopath,
    root = root.display(),
    payload = payload,
  );
  write_script(&root.join("bin"), name, &body)
}
