mod build;
mod cache;
mod info;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use build::{BuildArgs, cmd_build};
pub use cache::{cmd_cache_dir, cmd_clean};
pub use info::cmd_info;

/// Absolute form of a source path given on the command line, so the cache
/// directory does not depend on the working directory.
fn source_path(file: &Path) -> Result<PathBuf> {
  std::path::absolute(file).with_context(|| format!("Invalid source path: {}", file.display()))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
