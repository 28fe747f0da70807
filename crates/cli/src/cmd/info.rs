//! `gowasm info`: effective configuration and the toolchains a local build
//! would use.

use anyhow::Result;
use serde_json::json;

use gowasm_lib::Compiler;
use gowasm_lib::toolchain::{GOPATH, Toolchain, ToolchainResolver};

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let compiler = Compiler::from_env();
  let config = compiler.config();

  let rt = super::runtime()?;
  let resolver = ToolchainResolver::new(compiler.host());
  let mut toolchains = Vec::new();
  for toolchain in [Toolchain::Go, Toolchain::TinyGo] {
    let resolved = rt.block_on(resolver.resolve(toolchain));
    toolchains.push((toolchain, resolved));
  }

  if output.is_json() {
    let tools: serde_json::Map<String, serde_json::Value> = toolchains
      .iter()
      .map(|(toolchain, resolved)| {
        let value = match resolved {
          Ok(env) => json!({
            "root": env.roots.get(toolchain.root_var()),
            "executable": env.executable,
            "modulePath": env.module_path,
          }),
          Err(e) => json!({ "error": e.to_string() }),
        };
        (toolchain.to_string(), value)
      })
      .collect();
    let value = json!({
      "version": env!("CARGO_PKG_VERSION"),
      "runtime": config.runtime,
      "imageGo": config.image_go,
      "imageTinygo": config.image_tinygo,
      "cacheRoot": config.cache_root,
      "toolchains": tools,
    });
    return print_json(&value);
  }

  println!("gowasm v{}", env!("CARGO_PKG_VERSION"));
  print_stat("Runtime", &config.runtime);
  print_stat("Go image", &config.image_go);
  print_stat("TinyGo image", &config.image_tinygo);
  print_stat("Cache root", &config.cache_root.display().to_string());
  println!();
  println!("Toolchains:");
  for (toolchain, resolved) in &toolchains {
    match resolved {
      Ok(env) => {
        let root = env.roots.get(toolchain.root_var()).map(|p| p.display().to_string());
        print_stat(toolchain.root_var(), root.as_deref().unwrap_or("-"));
        if *toolchain == Toolchain::Go {
          print_stat(GOPATH, &env.module_path);
        }
      }
      Err(e) => print_stat(toolchain.root_var(), &format!("not found ({})", e)),
    }
  }
  Ok(())
}
