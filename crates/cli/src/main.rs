mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::BuildArgs;
use crate::output::{OutputFormat, print_error};

/// gowasm - compile Go sources to WebAssembly
#[derive(Parser)]
#[command(name = "gowasm")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile a Go source file to a WebAssembly module
  Build(BuildArgs),

  /// Print the cache directory a build of FILE uses
  CacheDir {
    /// Go source file
    file: PathBuf,
  },

  /// Remove the cache directory of FILE
  Clean {
    /// Go source file
    file: PathBuf,
  },

  /// Show configuration and detected toolchains
  Info {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let verbose = cli.verbose || matches!(&cli.command, Commands::Build(args) if args.debug_requested());
  let default_level = if verbose { "info" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli.command) {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(command: Commands) -> Result<()> {
  match command {
    Commands::Build(args) => cmd::cmd_build(args),
    Commands::CacheDir { file } => cmd::cmd_cache_dir(&file),
    Commands::Clean { file } => cmd::cmd_clean(&file),
    Commands::Info { output } => cmd::cmd_info(output),
  }
}
