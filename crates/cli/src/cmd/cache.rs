//! `gowasm cache-dir` and `gowasm clean`.

use std::path::Path;

use anyhow::Result;

use gowasm_lib::Compiler;

use crate::output::{print_info, print_success};

pub fn cmd_cache_dir(file: &Path) -> Result<()> {
  let compiler = Compiler::from_env();
  let source = super::source_path(file)?;
  println!("{}", compiler.cache_dir_for(&source).display());
  Ok(())
}

pub fn cmd_clean(file: &Path) -> Result<()> {
  let compiler = Compiler::from_env();
  let source = super::source_path(file)?;
  let dir = compiler.cache_dir_for(&source);

  if !dir.exists() {
    print_info(&format!("Nothing to clean at {}", dir.display()));
    return Ok(());
  }

  let rt = super::runtime()?;
  rt.block_on(compiler.cache().clear(&dir))?;
  print_success(&format!("Removed {}", dir.display()));
  Ok(())
}
