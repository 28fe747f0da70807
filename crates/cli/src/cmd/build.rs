//! Implementation of the `gowasm build` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::debug;

use gowasm_lib::options::OptionOverrides;
use gowasm_lib::{BuildOptions, Compiler, Config, HostEnv, WarningSink};

use crate::output::{format_bytes, format_duration, print_stat, print_success, print_warning};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Go source file to compile
  file: PathBuf,

  /// Where to write the module (default: FILE with a .wasm extension)
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Remove the cache directory before and after the build
  #[arg(long)]
  clear_cache: bool,

  /// Compile with TinyGo instead of Go
  #[arg(long)]
  tinygo: bool,

  /// Build inside a container
  #[arg(long)]
  docker: bool,

  /// Container image, without tag
  #[arg(long)]
  image: Option<String>,

  /// Container image tag
  #[arg(long)]
  image_tag: Option<String>,

  /// Log toolchain and container commands
  #[arg(long)]
  debug: bool,

  /// Build options as a JSON object; flags take precedence
  #[arg(long, value_name = "JSON")]
  options: Option<String>,
}

impl BuildArgs {
  /// Options for this invocation: `--options` over the configured defaults,
  /// then explicit flags over that.
  fn build_options(&self, config: &Config) -> Result<BuildOptions> {
    let base = match &self.options {
      Some(raw) => {
        let value: serde_json::Value = serde_json::from_str(raw).context("--options is not valid JSON")?;
        BuildOptions::from_json(&value, &config.defaults)?
      }
      None => config.defaults.clone(),
    };

    let overrides = OptionOverrides {
      clear_cache: self.clear_cache.then_some(true),
      tinygo: self.tinygo.then_some(true),
      docker: self.docker.then_some(true),
      image: self.image.clone(),
      image_tag: self.image_tag.clone(),
      debug: self.debug.then_some(true),
    };
    Ok(overrides.apply(&base))
  }

  /// Whether command logging is requested, by `--debug` or by `debug` in
  /// `--options`. Malformed options are reported later by the build itself.
  pub fn debug_requested(&self) -> bool {
    let config = Config::from_env(&HostEnv::capture());
    self.debug || self.build_options(&config).is_ok_and(|options| options.debug)
  }

  fn output_path(&self) -> PathBuf {
    self.output.clone().unwrap_or_else(|| self.file.with_extension("wasm"))
  }
}

/// Prints toolchain warnings to the terminal.
struct TerminalSink;

impl WarningSink for TerminalSink {
  fn warn(&self, message: &str) {
    for line in message.lines() {
      print_warning(line);
    }
  }
}

pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let start = Instant::now();
  let source = super::source_path(&args.file)?;
  if !source.is_file() {
    bail!("Source file not found: {}", args.file.display());
  }

  let host = HostEnv::capture();
  let config = Config::from_env(&host);
  let options = args.build_options(&config)?;
  debug!(?options, source = %source.display(), "resolved build options");
  let compiler = Compiler::new(config, host, Arc::new(TerminalSink));

  let rt = super::runtime()?;
  let bytes = rt
    .block_on(compiler.compile(&source, &options))
    .with_context(|| format!("Failed to compile {}", args.file.display()))?;

  let output = args.output_path();
  write_module(&output, &bytes)?;

  print_success(&format!("Built {}", output.display()));
  print_stat("Size", &format_bytes(bytes.len() as u64));
  print_stat("Toolchain", &options.toolchain().to_string());
  print_stat("Duration", &format_duration(start.elapsed()));
  Ok(())
}

fn write_module(path: &Path, bytes: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
