//! Builds inside a container.
//!
//! The source directory, the cache directory and every host module path
//! entry are bind-mounted into the container. The toolchain writes the
//! artifact into the mounted cache directory, so it is read back from the
//! host side once the container exits.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::backend::{CompileBackend, check_build, read_artifact, spawn_failed};
use crate::command::{BuildCommand, CommandTarget, build_command, container_output_path};
use crate::config::Config;
use crate::consts::CONTAINER_WORKDIR;
use crate::error::{BuildError, Result};
use crate::mounts::MountSpec;
use crate::options::BuildOptions;
use crate::request::{BuildContext, BuildRequest};
use crate::toolchain::{GOPATH, split_module_path};
use crate::util::process;

/// Image to build with: the `image` option or the toolchain's default,
/// tagged with `image_tag`.
pub fn image_reference(config: &Config, options: &BuildOptions) -> String {
  let image = options
    .image
    .as_deref()
    .unwrap_or_else(|| config.default_image(options.toolchain()));
  format!("{}:{}", image, options.image_tag)
}

/// Arguments for the runtime's `run` subcommand.
///
/// Shape: `run --name <name> --rm -w <workdir> [-e K=V]... [-v local:target]...
/// <image> <program> <args>...`
pub fn run_args(container_name: &str, mounts: &MountSpec, command: &BuildCommand, image: &str) -> Vec<String> {
  let mut args = vec![
    "run".to_string(),
    "--name".to_string(),
    container_name.to_string(),
    "--rm".to_string(),
    "-w".to_string(),
    CONTAINER_WORKDIR.to_string(),
  ];
  for (key, value) in &command.env {
    args.push("-e".to_string());
    args.push(format!("{}={}", key, value));
  }
  for mount in mounts.iter() {
    args.push("-v".to_string());
    args.push(mount.volume_arg());
  }
  args.push(image.to_string());
  args.extend(command.argv());
  args
}

/// Runs the toolchain through the configured container runtime.
#[derive(Debug, Clone, Copy)]
pub struct ContainerBackend<'a> {
  ctx: &'a BuildContext,
}

impl<'a> ContainerBackend<'a> {
  pub fn new(ctx: &'a BuildContext) -> Self {
    Self { ctx }
  }

  fn runtime(&self) -> &str {
    &self.ctx.config.runtime
  }

  /// Make sure `image` exists locally, pulling it otherwise.
  ///
  /// A failed inspection only means "not present"; a failed pull is fatal.
  async fn ensure_image(&self, image: &str, verbose: bool) -> Result<()> {
    let inspect = vec![
      "image".to_string(),
      "inspect".to_string(),
      image.to_string(),
      "-f".to_string(),
      "{{.RepoTags}}".to_string(),
    ];
    match process::run(self.runtime(), &inspect, Some(self.ctx.host.vars()), None, verbose).await {
      Ok(output) if output.success() => {
        debug!(image, "image present locally");
        return Ok(());
      }
      Ok(output) => debug!(image, stderr = %output.stderr, "image inspection failed"),
      Err(e) => debug!(image, error = %e, "image inspection failed"),
    }

    info!(image, "image not found locally, pulling");
    let pull = vec!["pull".to_string(), image.to_string()];
    let output = process::run(self.runtime(), &pull, Some(self.ctx.host.vars()), None, verbose)
      .await
      .map_err(|e| BuildError::ImagePullFailed {
        image: image.to_string(),
        stderr: e.to_string(),
      })?;
    if !output.success() {
      return Err(BuildError::ImagePullFailed {
        image: image.to_string(),
        stderr: output.stderr,
      });
    }
    info!(image, "pulled image");
    Ok(())
  }

  /// Work out mounts and the `run` arguments for `request`.
  pub(crate) async fn prepare(&self, request: &BuildRequest, image: &str) -> Result<Vec<String>> {
    let source_dir = tokio::fs::canonicalize(&request.source_dir)
      .await
      .map(|dir| dunce::simplified(&dir).to_path_buf())
      .map_err(|e| BuildError::BuildFailed {
        program: self.runtime().to_string(),
        code: None,
        stderr: format!("cannot access {}: {}", request.source_dir.display(), e),
      })?;

    let module_paths: Vec<PathBuf> = match self.ctx.host.get(GOPATH) {
      Some(raw) => {
        debug!(module_path = raw, "mounting host module path");
        split_module_path(raw)
      }
      None => {
        debug!("no host module path to mount");
        Vec::new()
      }
    };

    // Bind mount sources must be absolute or the runtime treats them as
    // named volumes.
    let cache_dir = std::path::absolute(&request.cache_dir)
      .map(|dir| dunce::simplified(&dir).to_path_buf())
      .map_err(|e| BuildError::cache_io(&request.cache_dir, e))?;

    let mounts = MountSpec::new(&source_dir, &cache_dir, &module_paths);
    let command = build_command(
      CommandTarget::Container {
        toolchain: request.options.toolchain(),
        mounts: &mounts,
      },
      &container_output_path(),
      &request.source_file,
    );
    let name = format!("{}{}", self.ctx.config.container_prefix, request.hash);
    Ok(run_args(&name, &mounts, &command, image))
  }
}

impl CompileBackend for ContainerBackend<'_> {
  async fn compile(&self, request: &BuildRequest) -> Result<Vec<u8>> {
    let verbose = request.options.debug;
    let image = image_reference(&self.ctx.config, &request.options);

    let ((), args) = tokio::try_join!(self.ensure_image(&image, verbose), self.prepare(request, &image))?;

    info!(
      image = %image,
      source = %request.source_path.display(),
      "building in container"
    );
    let runtime = self.runtime();
    let output = process::run(runtime, &args, Some(self.ctx.host.vars()), None, verbose)
      .await
      .map_err(|e| spawn_failed(runtime, e))?;
    check_build(self.ctx, runtime, output)?;

    read_artifact(&request.output_path(), runtime).await
  }
}
