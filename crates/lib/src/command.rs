//! Build command synthesis.
//!
//! Go and TinyGo disagree on how they are told to target WebAssembly: Go
//! reads `GOOS`/`GOARCH` from the environment, TinyGo takes `-target wasm`
//! and additionally needs `HOME` and `PATH` to find its support files. Both
//! backends build their command here so the two stay in step.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::HostEnv;
use crate::consts::{CONTAINER_CACHE_DIR, OUTPUT_FILE_NAME};
use crate::mounts::MountSpec;
use crate::toolchain::{GOPATH, Toolchain, ToolchainEnv};

pub const GOCACHE: &str = "GOCACHE";
pub const GOOS: &str = "GOOS";
pub const GOARCH: &str = "GOARCH";

/// Variables forwarded from the host to a local TinyGo build.
const TINYGO_FORWARDED_VARS: &[&str] = &["HOME", "PATH"];

/// A program invocation with its complete environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
  pub program: PathBuf,
  pub args: Vec<String>,
  pub env: BTreeMap<String, String>,
}

impl BuildCommand {
  /// Program followed by its arguments.
  pub fn argv(&self) -> Vec<String> {
    let mut argv = Vec::with_capacity(self.args.len() + 1);
    argv.push(self.program.to_string_lossy().into_owned());
    argv.extend(self.args.iter().cloned());
    argv
  }
}

/// Where a build command runs and what it runs against.
#[derive(Debug, Clone, Copy)]
pub enum CommandTarget<'a> {
  /// A resolved local toolchain, building into `cache_dir`.
  Local {
    toolchain: &'a ToolchainEnv,
    host: &'a HostEnv,
    cache_dir: &'a Path,
  },
  /// The toolchain on the image's `PATH`, with host directories mounted.
  Container { toolchain: Toolchain, mounts: &'a MountSpec },
}

/// Arguments of a build writing `output` from `input`.
pub fn build_args(toolchain: Toolchain, output: &str, input: &str) -> Vec<String> {
  let mut args = vec!["build".to_string()];
  if toolchain == Toolchain::TinyGo {
    args.extend(["-target".to_string(), "wasm".to_string()]);
  }
  args.extend(["-o".to_string(), output.to_string(), input.to_string()]);
  args
}

/// Build the command compiling `input` into `output` for `target`.
///
/// `input` is relative to the working directory, which is the source
/// directory for both backends.
pub fn build_command(target: CommandTarget<'_>, output: &str, input: &str) -> BuildCommand {
  match target {
    CommandTarget::Local {
      toolchain,
      host,
      cache_dir,
    } => {
      let mut env: BTreeMap<String, String> = toolchain
        .roots
        .iter()
        .map(|(var, root)| (var.clone(), root.to_string_lossy().into_owned()))
        .collect();
      env.insert(GOPATH.to_string(), toolchain.module_path.clone());
      env.insert(GOCACHE.to_string(), cache_dir.to_string_lossy().into_owned());

      match toolchain.toolchain {
        Toolchain::Go => insert_wasm_target(&mut env),
        Toolchain::TinyGo => {
          for var in TINYGO_FORWARDED_VARS {
            if let Some(value) = host.get(var) {
              env.insert(var.to_string(), value.to_string());
            }
          }
        }
      }

      BuildCommand {
        program: toolchain.executable.clone(),
        args: build_args(toolchain.toolchain, output, input),
        env,
      }
    }
    CommandTarget::Container { toolchain, mounts } => {
      let mut env = BTreeMap::new();
      env.insert(GOPATH.to_string(), mounts.container_module_path());
      env.insert(GOCACHE.to_string(), CONTAINER_CACHE_DIR.to_string());
      if toolchain == Toolchain::Go {
        insert_wasm_target(&mut env);
      }

      BuildCommand {
        program: PathBuf::from(toolchain.binary_name()),
        args: build_args(toolchain, output, input),
        env,
      }
    }
  }
}

/// Artifact path as seen from inside the container.
pub fn container_output_path() -> String {
  format!("{}/{}", CONTAINER_CACHE_DIR, OUTPUT_FILE_NAME)
}

fn insert_wasm_target(env: &mut BTreeMap<String, String>) {
  env.insert(GOOS.to_string(), "js".to_string());
  env.insert(GOARCH.to_string(), "wasm".to_string());
}
