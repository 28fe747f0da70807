//! Builds with a locally installed toolchain.

use tracing::info;

use crate::backend::{CompileBackend, check_build, read_artifact, spawn_failed};
use crate::command::{CommandTarget, build_command};
use crate::error::Result;
use crate::request::{BuildContext, BuildRequest};
use crate::toolchain::ToolchainResolver;
use crate::util::process;

/// Runs the resolved toolchain binary as a subprocess in the source
/// directory. The child sees only the synthesized environment.
#[derive(Debug, Clone, Copy)]
pub struct LocalBackend<'a> {
  ctx: &'a BuildContext,
}

impl<'a> LocalBackend<'a> {
  pub fn new(ctx: &'a BuildContext) -> Self {
    Self { ctx }
  }
}

impl CompileBackend for LocalBackend<'_> {
  async fn compile(&self, request: &BuildRequest) -> Result<Vec<u8>> {
    let verbose = request.options.debug;
    let toolchain = ToolchainResolver::new(&self.ctx.host)
      .verbose(verbose)
      .resolve(request.options.toolchain())
      .await?;

    let output_path = request.output_path();
    let command = build_command(
      CommandTarget::Local {
        toolchain: &toolchain,
        host: &self.ctx.host,
        cache_dir: &request.cache_dir,
      },
      &output_path.to_string_lossy(),
      &request.source_file,
    );
    let program = toolchain.toolchain.binary_name();

    info!(
      toolchain = %toolchain.toolchain,
      source = %request.source_path.display(),
      "building locally"
    );

    let output = process::run(
      &command.program,
      &command.args,
      Some(&command.env),
      Some(&request.source_dir),
      verbose,
    )
    .await
    .map_err(|e| spawn_failed(program, e))?;
    check_build(self.ctx, program, output)?;

    read_artifact(&output_path, program).await
  }
}
